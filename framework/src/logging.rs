use log::LevelFilter;

const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

pub fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(DEFAULT_LEVEL)
        .filter_module("wgpu_core", LevelFilter::Warn)
        // Workaround for https://github.com/gfx-rs/wgpu/issues/6043
        .filter_module("wgpu_core::device::resource", LevelFilter::Warn)
        .filter_module("wgpu_hal", LevelFilter::Warn)
        .filter_module("naga", LevelFilter::Info)
        .filter_module("calloop", LevelFilter::Info)
        .init();
}
