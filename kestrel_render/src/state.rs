//! Abstraction over the GPU device and surface state.
//!
//! [`State`] is responsible for picking a backend, creating the GPU device
//! and producing surface configurations. Swapchain ownership lives in the
//! [`Renderer`](crate::Renderer).

use futures::executor::block_on;
use kestrel_utils::EngineArgs;
use snafu::{ResultExt, Snafu, ensure};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use wgpu::{
    Adapter, Backends, CreateSurfaceError, Device, DeviceDescriptor, ExperimentalFeatures,
    Features, Instance, InstanceDescriptor, Limits, MemoryHints, PowerPreference, Queue,
    RequestAdapterError, RequestAdapterOptions, RequestDeviceError, Surface,
    SurfaceConfiguration, TextureFormat,
};
use winit::dpi::PhysicalSize;
use winit::window::Window;

const DEFAULT_BACKENDS: &[Backends] = &[
    Backends::DX12,
    Backends::METAL,
    Backends::VULKAN,
    Backends::GL,
];

type Result<T, E = StateError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum StateError {
    #[snafu(display("Unable to find a graphics adapter: {source}"))]
    RequestAdapter { source: RequestAdapterError },

    #[snafu(display("Unable to get device: {source}"))]
    RequestDevice { source: RequestDeviceError },

    #[snafu(display(
        "Can only run on Bgra8UnormSrgb currently, but it's not supported by your GPU. Available: {formats:?}"
    ))]
    ColorFormatNotAvailable { formats: Vec<TextureFormat> },

    #[snafu(display("Unable to create surface: {source}"))]
    CreateSurface { source: CreateSurfaceError },
}

#[allow(unused)]
pub struct State {
    pub(crate) instance: Instance,
    pub(crate) adapter: Adapter,
    pub(crate) device: Device,
    pub(crate) queue: Queue,
}

impl State {
    // will respect the order of backends passed instead of a plain `Backends`
    fn try_setup_instance_with(
        window: Arc<Window>,
        backends: &[Backends],
    ) -> Result<(Instance, Surface<'static>)> {
        for backend in backends {
            let mut desc = InstanceDescriptor::from_env_or_default();

            desc.backends = *backend;

            let instance = Instance::new(&desc);
            match instance.create_surface(window.clone()) {
                Ok(surface) => {
                    info!("Selected backend: {backend:?}");
                    return Ok((instance, surface));
                }
                Err(_) => debug!("Failed to start on backend: {backend:?}"),
            }
        }

        warn!(
            "Couldn't start on any selected graphics backend. Retrying with all available backends"
        );

        Self::setup_instance(window)
    }

    fn setup_instance(window: Arc<Window>) -> Result<(Instance, Surface<'static>)> {
        let desc = InstanceDescriptor::from_env_or_default();

        let instance = Instance::new(&desc);
        let surface = instance
            .create_surface(window)
            .context(CreateSurfaceErr)?;
        Ok((instance, surface))
    }

    async fn setup_adapter(instance: &Instance, surface: &Surface<'static>) -> Result<Adapter> {
        instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                ..RequestAdapterOptions::default()
            })
            .await
            .context(RequestAdapterErr)
    }

    async fn get_device_and_queue(adapter: &Adapter) -> Result<(Device, Queue)> {
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Renderer Hardware"),
                required_features: Features::default(),
                required_limits: Limits::default(),
                experimental_features: ExperimentalFeatures::disabled(),
                memory_hints: MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context(RequestDeviceErr)?;

        Ok((device, queue))
    }

    fn preferred_surface_format(formats: &[TextureFormat]) -> Result<TextureFormat> {
        ensure!(
            formats.contains(&TextureFormat::Bgra8UnormSrgb),
            ColorFormatNotAvailableErr {
                formats: formats.to_vec()
            }
        );

        Ok(TextureFormat::Bgra8UnormSrgb)
    }

    fn clamp_size(size: PhysicalSize<u32>) -> PhysicalSize<u32> {
        PhysicalSize {
            width: size.width.max(1),
            height: size.height.max(1),
        }
    }

    pub fn surface_config(
        &self,
        surface: &Surface<'_>,
        size: PhysicalSize<u32>,
    ) -> Result<SurfaceConfiguration> {
        Self::_surface_config(&self.adapter, surface, size)
    }

    fn _surface_config(
        adapter: &Adapter,
        surface: &Surface<'_>,
        size: PhysicalSize<u32>,
    ) -> Result<SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = Self::preferred_surface_format(&caps.formats)?;
        let size = Self::clamp_size(size);

        let max_frame_latency = EngineArgs::get().max_frames_in_flight.unwrap_or(1);
        let present_mode = EngineArgs::requested_present_mode()
            .or_else(|| caps.present_modes.first().copied())
            .unwrap_or(wgpu::PresentMode::Fifo);

        Ok(SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: max_frame_latency,
        })
    }

    fn log_adapter_banner(adapter: &Adapter) {
        let info = adapter.get_info();
        info!("--------------------------------------------");
        info!("Adapter:  {} ({:?})", info.name, info.device_type);
        info!("Backend:  {:?}", info.backend);
        info!("Driver:   {} {}", info.driver, info.driver_info);
        info!("--------------------------------------------");
    }

    pub fn new(window: Arc<Window>) -> Result<(Self, Surface<'static>, SurfaceConfiguration)> {
        trace!("Starting with backends: {DEFAULT_BACKENDS:?}");

        let (instance, surface) = Self::try_setup_instance_with(window.clone(), DEFAULT_BACKENDS)?;
        let adapter = block_on(Self::setup_adapter(&instance, &surface))?;

        Self::log_adapter_banner(&adapter);

        let (device, queue) = block_on(Self::get_device_and_queue(&adapter))?;
        let size = Self::clamp_size(window.inner_size());
        let config = Self::_surface_config(&adapter, &surface, size)?;

        Ok((
            State {
                instance,
                adapter,
                device,
                queue,
            },
            surface,
            config,
        ))
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}
