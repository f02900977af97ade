//! Lixi Draw entry point
//!
//! Handles platform-specific initialization and runs the game loop. The DOM
//! is rebuilt once at startup and then written every frame as a projection
//! of the simulation state; no game logic lives in the event handlers.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlElement, MouseEvent};

    use lixi_draw::audio::{AudioManager, SoundEffect};
    use lixi_draw::consts::*;
    use lixi_draw::history::{format_relative, DrawHistory};
    use lixi_draw::settings::Settings;
    use lixi_draw::sim::{
        grid_size, tick, GameEvent, GamePhase, GameState, Prize, TickInput,
    };

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: TickInput,
        accumulator: f32,
        last_time: f64,
        settings: Settings,
        history: DrawHistory,
        audio: AudioManager,
        // Envelope elements and their value faces, in id order
        envelope_els: Vec<HtmlElement>,
        front_els: Vec<Element>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, history: DrawHistory) -> Self {
            let mut state = GameState::new(seed);
            state.timings = settings.timings();

            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_muted(!settings.sound);

            Self {
                state,
                input: TickInput::default(),
                accumulator: 0.0,
                last_time: 0.0,
                settings,
                history,
                audio,
                envelope_els: Vec::new(),
                front_els: Vec::new(),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // All inputs are one-shot; clear after processing
                self.input = TickInput::default();
            }
        }

        /// React to simulation events (sound, history, logs)
        fn handle_events(&mut self, document: &Document) {
            let events: Vec<GameEvent> = self.state.events.drain(..).collect();
            for event in events {
                match event {
                    GameEvent::FlipStarted => self.audio.play(SoundEffect::Flip),
                    GameEvent::ShuffleStep => self.audio.play(SoundEffect::Swap),
                    GameEvent::EnvelopeSelected => self.audio.play(SoundEffect::Select),
                    GameEvent::Revealed { prize } => {
                        self.audio.play(SoundEffect::Win);
                        let slot = self.state.selected.unwrap_or(0);
                        self.history.record(prize.label(), slot, js_sys::Date::now());
                        self.history.save();
                        render_history(document, &self.history);
                        log::info!("Revealed {} on slot {}", prize.label(), slot + 1);
                    }
                    GameEvent::OverlayShown => {}
                    GameEvent::BoardReset => log::info!("Board reset"),
                }
            }
        }

        /// Write the current state into the DOM
        fn sync_dom(&self, document: &Document) {
            let phase = self.state.phase;

            if let Some(grid) = document.get_element_by_id("grid") {
                let _ = grid.set_attribute(
                    "class",
                    if self.state.is_shuffling() {
                        "shuffling"
                    } else {
                        ""
                    },
                );
            }

            for (env, (el, front)) in self
                .state
                .envelopes
                .iter()
                .zip(self.envelope_els.iter().zip(self.front_els.iter()))
            {
                let mut class = String::from("envelope-item");
                if env.flipped {
                    class.push_str(" flipped");
                }
                if self.state.selected == Some(env.id) {
                    class.push_str(" selected");
                }
                if env.revealed {
                    class.push_str(" revealed");
                }
                let _ = el.set_attribute("class", &class);

                let style = el.style();
                let _ = style.set_property("left", &format!("{}px", env.pos.x));
                let _ = style.set_property("top", &format!("{}px", env.pos.y));

                let label = env.prize.label();
                if front.text_content().as_deref() != Some(label.as_str()) {
                    front.set_text_content(Some(&label));
                }
            }

            if let Some(btn) = document.get_element_by_id("start-btn") {
                if let Ok(btn) = btn.dyn_into::<web_sys::HtmlButtonElement>() {
                    btn.set_disabled(phase != GamePhase::Idle);
                }
            }

            let can_confirm =
                phase == GamePhase::AwaitingSelection && self.state.selected.is_some();
            if let Some(btn) = document.get_element_by_id("confirm-btn") {
                let _ = btn.set_attribute("class", if can_confirm { "" } else { "hidden" });
                if let Ok(btn) = btn.dyn_into::<web_sys::HtmlButtonElement>() {
                    btn.set_disabled(!can_confirm);
                }
            }

            if let Some(overlay) = document.get_element_by_id("celebration-overlay") {
                let _ = overlay.set_attribute(
                    "class",
                    if phase == GamePhase::Celebrating {
                        "visible"
                    } else {
                        "hidden"
                    },
                );
            }
            if let Some(el) = document.get_element_by_id("overlay-prize") {
                el.set_text_content(Some(&Prize::JACKPOT.label()));
            }
        }
    }

    /// Build the envelope grid DOM once; afterwards `sync_dom` only mutates
    /// classes, positions and labels.
    fn build_grid(document: &Document, game: &mut Game) {
        let grid = document.get_element_by_id("grid").expect("no grid");
        grid.set_inner_html("");
        game.envelope_els.clear();
        game.front_els.clear();

        let size = grid_size(game.state.envelopes.len());
        if let Ok(grid_el) = grid.clone().dyn_into::<HtmlElement>() {
            let style = grid_el.style();
            let _ = style.set_property("position", "relative");
            let _ = style.set_property("width", &format!("{}px", size.x));
            let _ = style.set_property("height", &format!("{}px", size.y));
        }

        for env in &game.state.envelopes {
            let el: HtmlElement = document
                .create_element("div")
                .expect("create envelope")
                .dyn_into()
                .expect("not an html element");
            let _ = el.set_attribute("class", "envelope-item");
            let _ = el.set_attribute("data-id", &env.id.to_string());

            let style = el.style();
            let _ = style.set_property("position", "absolute");
            let _ = style.set_property("width", &format!("{}px", CELL_WIDTH));
            let _ = style.set_property("height", &format!("{}px", CELL_HEIGHT));

            let front = document.create_element("div").expect("create face");
            let _ = front.set_attribute("class", "face front");
            front.set_text_content(Some(&env.prize.label()));

            let back = document.create_element("div").expect("create face");
            let _ = back.set_attribute("class", "face back");
            back.set_inner_html(
                "<span class=\"deco-text\">L\u{00ec} X\u{00ec}</span><span class=\"icon\">\u{1F9E7}</span>",
            );

            let _ = el.append_child(&front);
            let _ = el.append_child(&back);
            let _ = grid.append_child(&el);

            game.front_els.push(front);
            game.envelope_els.push(el);
        }
    }

    /// Render the past-draws list
    fn render_history(document: &Document, history: &DrawHistory) {
        let Some(list) = document.get_element_by_id("history-list") else {
            return;
        };
        list.set_inner_html("");

        let now = js_sys::Date::now();
        for record in &history.entries {
            if let Ok(item) = document.create_element("li") {
                item.set_text_content(Some(&format!(
                    "{} \u{00b7} slot {} \u{00b7} {}",
                    record.prize,
                    record.slot + 1,
                    format_relative(now, record.timestamp)
                )));
                let _ = list.append_child(&item);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lixi Draw starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let history = DrawHistory::load();

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(seed, settings, history);
        log::info!("Session initialized with seed: {}", seed);

        build_grid(&document, &mut game);
        render_history(&document, &game.history);

        let game = Rc::new(RefCell::new(game));
        setup_buttons(game.clone());
        setup_grid_click(game.clone());
        setup_keyboard(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Lixi Draw running!");
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.start = true;
                // First user gesture; let the audio context wake up
                g.audio.resume();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("confirm-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.confirm = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("close-overlay") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.close_overlay = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_grid_click(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Some(grid) = document.get_element_by_id("grid") else {
            return;
        };

        // Event delegation: one listener, clicks resolved to envelope ids
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(target) = event.target() else { return };
            let Ok(el) = target.dyn_into::<Element>() else {
                return;
            };
            let Ok(Some(item)) = el.closest(".envelope-item") else {
                return;
            };
            let Some(id) = item
                .get_attribute("data-id")
                .and_then(|s| s.parse::<u32>().ok())
            else {
                return;
            };
            game.borrow_mut().input.select = Some(id);
        });
        let _ = grid.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                " " | "Enter" => {
                    if g.state.phase == GamePhase::Idle {
                        g.input.start = true;
                        g.audio.resume();
                    } else {
                        g.input.confirm = true;
                    }
                }
                "Escape" => g.input.close_overlay = true,
                "m" | "M" => {
                    g.settings.sound = !g.settings.sound;
                    g.settings.save();
                    let muted = !g.settings.sound;
                    g.audio.set_muted(muted);
                    log::info!("Sound {}", if muted { "muted" } else { "on" });
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let document = web_sys::window().unwrap().document().unwrap();
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.handle_events(&document);
            g.sync_dom(&document);
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
    env_logger::init();
    log::info!("Lixi Draw (native) starting...");
    log::info!("Native mode is a headless smoke run - use `trunk serve` for the web version");

    smoke_run_draw();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive one scripted draw through every phase without a browser
#[cfg(not(target_arch = "wasm32"))]
fn smoke_run_draw() {
    use lixi_draw::sim::{tick, GamePhase, GameState, Prize, TickInput};

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0xC0FFEE);
    let mut state = GameState::new(seed);

    tick(
        &mut state,
        &TickInput {
            start: true,
            ..Default::default()
        },
    );

    let idle = TickInput::default();
    let mut guard = 0;
    while state.phase != GamePhase::AwaitingSelection {
        tick(&mut state, &idle);
        guard += 1;
        assert!(guard < 100_000, "draw never reached selection");
    }

    tick(
        &mut state,
        &TickInput {
            select: Some(1),
            ..Default::default()
        },
    );
    tick(
        &mut state,
        &TickInput {
            confirm: true,
            ..Default::default()
        },
    );

    let picked = state.envelope(1).expect("selected envelope");
    assert_eq!(picked.prize, Prize::JACKPOT);
    assert!(picked.revealed);
    println!(
        "✓ Headless draw revealed {} on envelope 2 (seed {})",
        picked.prize.label(),
        seed
    );
}
