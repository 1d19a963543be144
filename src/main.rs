//! Sprite Pong entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use sprite_pong::renderer::{AtlasImage, SpriteRenderState};
    use sprite_pong::sim::InputFlag;
    use sprite_pong::{Pong, Settings};

    /// Game instance holding all state
    struct Game {
        pong: Pong,
        render_state: SpriteRenderState,
        /// Set once a fatal frame error has been reported
        halted: bool,
    }

    impl Game {
        /// Run one tick and submit the batches
        fn frame(&mut self) {
            let frame = match self.pong.frame() {
                Ok((frame, _)) => frame,
                Err(e) => {
                    log::error!("Frame pipeline failed: {e}");
                    self.halted = true;
                    return;
                }
            };

            match self.render_state.render(&frame) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (w, h) = self.render_state.size;
                    self.render_state.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Sprite Pong starting...");

        let settings = Settings::load();

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };
        canvas.set_width(settings.window_width);
        canvas.set_height(settings.window_height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {e}");
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {e}");
                return;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state = match SpriteRenderState::new(
            surface,
            &adapter,
            settings.window_width,
            settings.window_height,
            &settings,
        )
        .await
        {
            Ok(render_state) => render_state,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };

        let atlas = AtlasImage::pong();
        let atlas_texture =
            render_state.upload_texture("pong_atlas", atlas.width, atlas.height, &atlas.rgba);

        let pong = match Pong::with_capacity(
            sprite_pong::renderer::TextureHandle::WHITE,
            atlas_texture,
            settings.max_draw_commands,
            sprite_pong::consts::MAX_BATCHES,
        ) {
            Ok(pong) => pong,
            Err(e) => {
                log::error!("Content budget check failed: {e}");
                return;
            }
        };

        let game = Rc::new(RefCell::new(Game {
            pong,
            render_state,
            halted: false,
        }));

        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Sprite Pong running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (event, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(flag) = InputFlag::from_key(event.key().as_str()) {
                    event.prevent_default();
                    game.borrow_mut().pong.set_input_flag(flag, pressed);
                }
            });
            let _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.frame();
            if g.halted {
                log::error!("Frame loop stopped");
                return;
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sprite Pong (native) starting...");
    log::info!("Native mode runs the frame pipeline headless - use `trunk serve` for the playable web version");

    if let Err(e) = run_headless(&sprite_pong::Settings::load()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive the tick → extract → batch cycle without a GPU
#[cfg(not(target_arch = "wasm32"))]
fn run_headless(settings: &sprite_pong::Settings) -> Result<(), sprite_pong::PongError> {
    use sprite_pong::Pong;
    use sprite_pong::renderer::TextureHandle;
    use sprite_pong::sim::InputFlag;

    const FRAMES: u64 = 600;

    let mut pong = Pong::with_capacity(
        TextureHandle::WHITE,
        TextureHandle::new(1),
        settings.max_draw_commands,
        sprite_pong::consts::MAX_BATCHES,
    )?;

    // Scripted key presses: right player chases, left player holds still
    let script = [
        (120, InputFlag::RightUp, true),
        (150, InputFlag::RightUp, false),
        (300, InputFlag::LeftDown, true),
        (340, InputFlag::LeftDown, false),
    ];

    for frame_index in 0..FRAMES {
        for &(at, flag, pressed) in &script {
            if at == frame_index {
                log::debug!("frame {frame_index}: {flag:?} {}", if pressed { "down" } else { "up" });
                pong.set_input_flag(flag, pressed);
            }
        }

        let (frame, _) = pong.frame()?;
        log::debug!(
            "frame {frame_index}: {} instances in {} batches",
            frame.instances.len(),
            frame.batches.len()
        );
    }

    let state = pong.state();
    log::info!(
        "Headless run finished after {} ticks, score {} - {}",
        state.time_ticks,
        state.score.left,
        state.score.right
    );
    if let Ok(json) = serde_json::to_string(state) {
        log::debug!("Final state: {json}");
    }
    Ok(())
}
