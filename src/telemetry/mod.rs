mod refresh;

pub use refresh::RefreshTelemetry;
