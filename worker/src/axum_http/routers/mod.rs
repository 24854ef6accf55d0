pub mod reconcile_uploads;
