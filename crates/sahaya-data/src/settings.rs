use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::FineKind;

/// Fine for every third consecutive meeting absence.
pub const MEETING_FINE: i64 = 500;

/// Configurable fine amounts.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub funeral_fine: i64,
    pub funeral_work_fine: i64,
    pub cemetery_work_fine: i64,
    pub common_work_fine: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            funeral_fine: 100,
            funeral_work_fine: 200,
            cemetery_work_fine: 200,
            common_work_fine: 300,
        }
    }
}

impl Settings {
    /// Amount of a fine kind. Extra dues are set per funeral.
    pub fn amount(&self, kind: FineKind) -> Option<i64> {
        match kind {
            FineKind::Meeting => Some(MEETING_FINE),
            FineKind::Funeral => Some(self.funeral_fine),
            FineKind::FuneralWork => Some(self.funeral_work_fine),
            FineKind::CemeteryWork => Some(self.cemetery_work_fine),
            FineKind::CommonWork => Some(self.common_work_fine),
            FineKind::ExtraDue => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts() {
        let settings = Settings {
            funeral_fine: 1,
            funeral_work_fine: 2,
            cemetery_work_fine: 3,
            common_work_fine: 4,
        };
        assert_eq!(settings.amount(FineKind::Meeting), Some(500));
        assert_eq!(settings.amount(FineKind::Funeral), Some(1));
        assert_eq!(settings.amount(FineKind::FuneralWork), Some(2));
        assert_eq!(settings.amount(FineKind::CemeteryWork), Some(3));
        assert_eq!(settings.amount(FineKind::CommonWork), Some(4));
        assert_eq!(settings.amount(FineKind::ExtraDue), None);
    }
}
