use crate::db::DatabaseError;

/// Status filter for the staff review listing. `All` matches every status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "all" => Ok(Self::All),
            _ => Err(DatabaseError::InvalidEnum {
                field: "StatusFilter".into(),
                value: s.into(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestFilter {
    pub status: StatusFilter,
}
