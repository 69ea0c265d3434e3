use crate::windowing::AppSettings;
use crate::world::World;
use kestrel_utils::EngineArgs;
use std::error::Error;
use std::marker::PhantomData;
use winit::dpi::{PhysicalSize, Size};
use winit::window::WindowAttributes;

/// The game hooked into the engine loop.
///
/// `init` runs once after the render state is up, `update` every frame
/// after the world's components ran, `destroy` when the loop winds down.
#[allow(unused)]
pub trait AppState: Sized + Default + 'static {
    fn init(&mut self, world: &mut World) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn update(&mut self, world: &mut World) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn destroy(&mut self, world: &mut World) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}

pub trait AppRuntime: AppState {
    fn configure(title: &str, width: u32, height: u32) -> AppSettings<Self>;

    fn default_config() -> AppSettings<Self>;
}

impl<S: AppState> AppRuntime for S {
    fn configure(title: &str, width: u32, height: u32) -> AppSettings<Self> {
        let (width, height) = EngineArgs::requested_window_size().unwrap_or((width, height));

        AppSettings {
            main_window: WindowAttributes::default()
                .with_inner_size(Size::Physical(PhysicalSize { width, height }))
                .with_title(title),
            _state_type: PhantomData,
        }
    }

    fn default_config() -> AppSettings<Self> {
        Self::configure("Kestrel", 1600, 900)
    }
}
