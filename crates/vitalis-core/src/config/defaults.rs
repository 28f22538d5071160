pub(super) fn default_name() -> String {
    "Vitalis".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.vitalis".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_storage_backend() -> String {
    "json".to_string()
}
pub(super) fn default_storage_path() -> String {
    "~/.vitalis/data/storage".to_string()
}
pub(super) fn default_reconcile_interval() -> u64 {
    60
}
pub(super) fn default_notification_backend() -> String {
    "local".to_string()
}
pub(super) fn default_notification_body() -> String {
    "Reminder alert!".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
