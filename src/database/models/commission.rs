use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fee and commission figures for one agent application (1:1, created lazily)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Commission {
    pub id: i32,
    pub application_id: i32,
    pub student_fee: i32,
    pub commission: i32,
    pub commission_rate: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommissionPatch {
    pub student_fee: Option<i32>,
    pub commission: Option<i32>,
    pub commission_rate: Option<i32>,
}

impl CommissionPatch {
    pub fn apply(&self, commission: &mut Commission) {
        if let Some(v) = self.student_fee {
            commission.student_fee = v;
        }
        if let Some(v) = self.commission {
            commission.commission = v;
        }
        if let Some(v) = self.commission_rate {
            commission.commission_rate = v;
        }
    }
}
