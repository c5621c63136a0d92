pub mod backup;
pub mod catalog;
pub mod changes;
pub mod ledger;
pub mod log;
pub mod onboarding;
pub mod totals;
pub mod view;
