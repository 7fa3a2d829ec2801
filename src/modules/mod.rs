pub mod eccotcp;

use ssevolution_kernel::ModuleRegistry;

/// Register the core and project modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register_core(std::sync::Arc::new(ssevolution_telemetry::TelemetryModule));
    registry.register_core(std::sync::Arc::new(ssevolution_db::DbModule::new()));
    registry.register_custom(eccotcp::create_module());
}
