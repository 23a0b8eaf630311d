pub mod keyer;
pub mod ledger;
pub mod unlock;
