//! Nethex Assault entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use nethex_assault::audio::{AudioManager, SoundEffect};
    use nethex_assault::sim::{tick, GameEvent, GameState, TickInput};
    use nethex_assault::ui::Hud;
    use nethex_assault::{HighScores, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: TickInput,
        audio: AudioManager,
        hud: Hud,
        settings: Settings,
        high_scores: HighScores,
        last_time: f64,
        /// Set once per run so game over doesn't re-submit every frame
        score_submitted: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);

            Self {
                state: GameState::new(seed),
                input: TickInput::default(),
                audio,
                hud: Hud::new(),
                settings,
                high_scores: HighScores::load(),
                last_time: 0.0,
                score_submitted: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run one simulation step and route its events
        fn update(&mut self, dt_ms: f32, time: f64) {
            let input = self.input;
            tick(&mut self.state, &input, dt_ms);

            // Clear one-shot inputs after processing
            self.input.toggle_pause = false;

            for event in self.state.drain_events() {
                self.handle_event(&event);
            }

            if self.state.game_over && !self.score_submitted {
                self.submit_score();
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 && time > oldest_time {
                self.fps = (60000.0 / (time - oldest_time)).round() as u32;
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }

            let document = web_sys::window().and_then(|w| w.document());
            let Some(document) = document else { return };

            match event {
                GameEvent::WaveStarted { name, .. } => {
                    self.hud.show_banner(&document, name);
                }
                GameEvent::BossWarning => {
                    self.hud.show_banner(&document, "WARNING: DREADNOUGHT DETECTED");
                }
                GameEvent::BossPhase(phase) => {
                    self.hud
                        .show_banner(&document, &format!("DREADNOUGHT PHASE {}", phase + 1));
                }
                GameEvent::GameOver { victory } => {
                    let text = if *victory {
                        "SECTOR LIBERATED"
                    } else {
                        "FLEET LOST"
                    };
                    self.hud.show_banner(&document, text);
                }
                _ => {}
            }
        }

        /// Push the finished run onto the leaderboard
        fn submit_score(&mut self) {
            self.score_submitted = true;
            let rank = self.high_scores.add_score(
                self.state.score,
                self.state.level,
                self.state.gems,
                js_sys::Date::now(),
            );
            if let Some(rank) = rank {
                self.high_scores.save();
                self.audio.play(SoundEffect::HighScore);
                log::info!("New high score, rank {}", rank);
            }
        }

        /// Reset for a fresh run
        fn restart(&mut self, seed: u64) {
            self.state = GameState::new(seed);
            self.input = TickInput::default();
            self.score_submitted = false;
            log::info!("Game restarted with seed: {}", seed);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Nethex Assault starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Nethex Assault running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keydown
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                // Browsers need a user gesture before audio may start
                g.audio.resume();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.move_left = true,
                    "ArrowRight" | "d" | "D" => g.input.move_right = true,
                    "ArrowUp" | "w" | "W" => g.input.move_up = true,
                    "ArrowDown" | "s" | "S" => g.input.move_down = true,
                    " " => {
                        event.prevent_default();
                        g.input.firing = true;
                    }
                    "Escape" | "p" | "P" => g.input.toggle_pause = true,
                    "m" | "M" => {
                        let muted = !g.audio.is_muted();
                        g.audio.set_muted(muted);
                        log::info!("Audio muted: {}", muted);
                    }
                    "r" | "R" => {
                        if g.state.game_over {
                            let seed = js_sys::Date::now() as u64;
                            g.restart(seed);
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyup
        {
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.move_left = false,
                    "ArrowRight" | "d" | "D" => g.input.move_right = false,
                    "ArrowUp" | "w" | "W" => g.input.move_up = false,
                    "ArrowDown" | "s" | "S" => g.input.move_down = false,
                    " " => g.input.firing = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if !g.state.paused && !g.state.game_over {
                        g.input.toggle_pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
                if !g.state.paused && !g.state.game_over {
                    g.input.toggle_pause = true;
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Delta in ms; the sim clamps long frames itself
            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                16.0
            };
            g.last_time = time;

            g.update(dt_ms, time);
            let fps = if g.settings.show_fps { g.fps } else { 0 };
            let Game { state, hud, .. } = &mut *g;
            hud.update(state, fps);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use nethex_assault::sim::{tick, GameEvent, GameState, TickInput};

    env_logger::init();
    log::info!("Nethex Assault (native) starting...");
    log::info!("Headless demo run - build for wasm32 to play in the browser");

    let mut state = GameState::new(0xC0FFEE);
    let input = TickInput {
        firing: true,
        ..TickInput::default()
    };

    // Simulate up to ten minutes at a fixed 60 Hz step
    let dt_ms = 1000.0 / 60.0;
    let max_ticks = 10 * 60 * 60;

    for _ in 0..max_ticks {
        tick(&mut state, &input, dt_ms);

        for event in state.drain_events() {
            match event {
                GameEvent::WaveStarted { index, name } => {
                    log::info!("wave {} started: {}", index + 1, name);
                }
                GameEvent::BossWarning => log::info!("boss warning issued"),
                GameEvent::BossSpawned => log::info!("boss on the field"),
                GameEvent::BossPhase(phase) => log::info!("boss phase {}", phase + 1),
                GameEvent::BossDefeated => log::info!("boss defeated"),
                GameEvent::LifeLost => log::info!("life lost, {} remaining", state.lives),
                GameEvent::GameOver { victory } => {
                    log::info!("game over, victory: {}", victory);
                }
                _ => {}
            }
        }

        if state.game_over {
            break;
        }
    }

    println!(
        "Run finished: score {}, gems {}, wave {}, {:.1}s simulated, victory: {}",
        state.score,
        state.gems,
        state.level,
        state.elapsed_ms / 1000.0,
        state.victory
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
