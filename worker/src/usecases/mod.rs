pub mod reconcile_orphaned_uploads;
