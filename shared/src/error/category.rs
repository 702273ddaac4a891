//! Error domains, derived from the code's thousands digit

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx
    Request,
    /// 4xxx
    Order,
    /// 6xxx
    Station,
    /// 7xxx
    Table,
    /// 9xxx and anything unassigned
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::Request,
            4 => Self::Order,
            6 => Self::Station,
            7 => Self::Table,
            _ => Self::System,
        }
    }

    /// Server-side failures get logged at error level
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_by_range() {
        assert_eq!(ErrorCategory::from_code(2), ErrorCategory::Request);
        assert_eq!(ErrorCategory::from_code(4007), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(6511), ErrorCategory::Station);
        assert_eq!(ErrorCategory::from_code(7101), ErrorCategory::Table);
        assert_eq!(ErrorCategory::from_code(9201), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(12000), ErrorCategory::System);
    }

    #[test]
    fn test_code_category() {
        assert_eq!(ErrorCode::OrderEmpty.category(), ErrorCategory::Order);
        assert!(ErrorCode::PrintFailed.category().is_system());
        assert!(!ErrorCode::ZoneNotFound.category().is_system());
    }
}
