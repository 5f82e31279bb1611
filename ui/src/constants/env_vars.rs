/// Environment variable name constants
/// Names used by the emulator's hosting setup are kept verbatim, including
/// their casing.
//
// Settings
pub const SETTINGS_OVERRIDE: &str = "AsbEmulatorUi__SettingsOverride";
pub const SETTINGS_OVERRIDE_UPPER: &str = "ASBEMULATORUI__SETTINGSOVERRIDE";

// Service Bus emulator
pub const ASB_RESOURCE_NAME: &str = "ASB_RESOURCE_NAME";
pub const CONNECTION_STRINGS_PREFIX: &str = "ConnectionStrings__";

// SQL storage behind the emulator
pub const ASB_SQL_CONNECTION_STRING: &str = "ASB_SQL_CONNECTIONSTRING";
pub const ASB_SQL_PORT: &str = "ASB_SQL_PORT";
pub const ASB_SQL_PASSWORD: &str = "ASB_SQL_PASSWORD";
