// ── Game shell ───────────────────────────────────────────────────────────────
//
// The winit application driving everything: window and renderer setup, asset
// loading, per-frame input routing, updates, and frame submission.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::dialogue::system::DialogueSystem;
use crate::gfx::renderer::Renderer;
use crate::gfx::text::Font;
use crate::gfx::{Frame, Rect};
use crate::input::{KeyCode, Keyboard};
use crate::overworld::object::OverworldObject;
use crate::overworld::sprite::AnimatedSprite;
use crate::overworld::Overworld;
use crate::tiles::TILE_SIZE;

/// Sprite-sheet row offsets for the player walk cycle, one per facing.
const FACE_UP: i32 = 0;
const FACE_RIGHT: i32 = 4;
const FACE_DOWN: i32 = 8;
const FACE_LEFT: i32 = 12;

// ── Config ───────────────────────────────────────────────────────────────────

/// Startup configuration: window shape and content paths.
pub struct ClientConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory scanned recursively for PNG textures, keyed by file stem.
    pub asset_dir: String,
    pub level_path: PathBuf,
    pub dialogue_path: PathBuf,
    pub font_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            title: "Waypost".into(),
            width: 800,
            height: 600,
            asset_dir: "assets".into(),
            level_path: "assets/maps/town1.json".into(),
            dialogue_path: "assets/dialogue/town1.json".into(),
            font_path: "assets/fonts/default.json".into(),
        }
    }
}

/// Create the window and run the game loop until quit.
pub fn run(config: ClientConfig) {
    let event_loop = EventLoop::new().unwrap();
    let mut app = App { config, client: None, last_instant: None };
    event_loop.run_app(&mut app).unwrap();
}

// ── Client state ─────────────────────────────────────────────────────────────

/// Everything that exists once the window is up.
struct Client {
    renderer: Renderer,
    frame: Frame,
    keyboard: Keyboard,
    overworld: Overworld,
    player: OverworldObject,
    player_sprite: AnimatedSprite,
    dialogue: DialogueSystem,
    font: Option<Font>,
}

impl Client {
    fn new(renderer: Renderer, config: &ClientConfig) -> Self {
        let mut overworld = Overworld::new();
        if let Some(tileset) = renderer.get("outdoor") {
            overworld.set_tileset(tileset);
        } else {
            eprintln!("app: tileset 'outdoor' not found under {}", config.asset_dir);
        }
        overworld.load_level(&config.level_path);

        let mut player = OverworldObject::new();
        player.draw_offset = Vec2::new(0.0, -8.0);
        player.place(Vec2::new(TILE_SIZE as f32 * 3.0, TILE_SIZE as f32 * 3.0));

        let mut player_sprite = AnimatedSprite::new();
        player_sprite.sheet = renderer.get("char-f");
        player_sprite.position = player.sprite_position();

        let size = renderer.window.inner_size();
        let mut dialogue = DialogueSystem::new(&config.dialogue_path);
        dialogue.viewport = Rect::new(0, 0, size.width as i32, size.height as i32);
        dialogue.blank = Some(renderer.blank());
        dialogue.bubble = renderer.get("speech-bubble");
        dialogue.character = renderer.get("portrait");

        let font = load_font(&renderer, config);

        Self {
            renderer,
            frame: Frame::new(),
            keyboard: Keyboard::new(),
            overworld,
            player,
            player_sprite,
            dialogue,
            font,
        }
    }

    /// One fixed game tick plus frame submission.
    fn tick(&mut self, event_loop: &ActiveEventLoop, dt: f32) {
        self.keyboard.begin_frame();

        if self.keyboard.is_down(KeyCode::Escape) {
            event_loop.exit();
            return;
        }

        // One axis at a time; horizontal wins, matching the grid mover.
        let mut movement = Vec2::ZERO;
        if self.keyboard.is_down(KeyCode::ArrowRight) || self.keyboard.is_down(KeyCode::ArrowLeft) {
            movement.x = if self.keyboard.is_down(KeyCode::ArrowRight) { 1.0 } else { -1.0 };
        } else if self.keyboard.is_down(KeyCode::ArrowUp) || self.keyboard.is_down(KeyCode::ArrowDown)
        {
            movement.y = if self.keyboard.is_down(KeyCode::ArrowUp) { -1.0 } else { 1.0 };
        }

        if movement.x < 0.0 {
            self.player_sprite.frame_offset = FACE_LEFT;
        } else if movement.x > 0.0 {
            self.player_sprite.frame_offset = FACE_RIGHT;
        } else if movement.y > 0.0 {
            self.player_sprite.frame_offset = FACE_DOWN;
        } else if movement.y < 0.0 {
            self.player_sprite.frame_offset = FACE_UP;
        }

        // The world freezes while a conversation is up.
        if !self.dialogue.is_shown() {
            if movement != Vec2::ZERO {
                self.player.move_toward(movement);
            }
            self.player.update(dt);
            self.player_sprite.update(dt);
            self.player_sprite.position = self.player.sprite_position();
        }

        self.dialogue.update(dt);
        if self.keyboard.was_just_pressed(KeyCode::Space) {
            self.dialogue.advance();
        }
        if self.keyboard.was_just_pressed(KeyCode::Enter) {
            self.dialogue.open();
        }
        if self.keyboard.was_just_pressed(KeyCode::ArrowUp) {
            self.dialogue.navigate_up();
        }
        if self.keyboard.was_just_pressed(KeyCode::ArrowDown) {
            self.dialogue.navigate_down();
        }

        // Record the frame back to front.
        self.frame.clear();
        self.overworld.draw_below(&mut self.frame);
        self.player_sprite.draw(&mut self.frame);
        self.overworld.draw_above(&mut self.frame);
        if let Some(font) = &self.font {
            self.dialogue.draw(&mut self.frame, font);
        }

        match self.renderer.render(&self.frame) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = self.renderer.window.inner_size();
                self.renderer.resize(size);
            }
            Err(e) => eprintln!("app: render error: {e}"),
        }
    }
}

/// Load the bitmap font descriptor and pair it with its atlas texture.
/// Either half missing is reported and disables text (and with it the
/// dialogue overlay) rather than aborting the game.
fn load_font(renderer: &Renderer, config: &ClientConfig) -> Option<Font> {
    let Some(texture) = renderer.get("font") else {
        eprintln!("app: font texture 'font' not found under {}", config.asset_dir);
        return None;
    };
    let json = match std::fs::read_to_string(&config.font_path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("app: could not read {}: {e}", config.font_path.display());
            return None;
        }
    };
    match Font::from_json(&json, texture) {
        Ok(font) => Some(font),
        Err(e) => {
            eprintln!("app: could not parse {}: {e}", config.font_path.display());
            None
        }
    }
}

// ── App (winit ApplicationHandler) ───────────────────────────────────────────

struct App {
    config: ClientConfig,
    client: Option<Client>,
    last_instant: Option<Instant>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(&self.config.title)
                        .with_inner_size(winit::dpi::PhysicalSize::new(
                            self.config.width,
                            self.config.height,
                        ))
                        .with_resizable(false),
                )
                .unwrap(),
        );

        let mut renderer = pollster::block_on(Renderer::new(window));
        renderer.load_folder(&self.config.asset_dir);

        self.client = Some(Client::new(renderer, &self.config));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(client) = self.client.as_ref() {
            client.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(client) = self.client.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                client.renderer.resize(size);
                client.dialogue.viewport = Rect::new(0, 0, size.width as i32, size.height as i32);
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                ..
            } => {
                client.keyboard.key_event(code, state == ElementState::Pressed);
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = match self.last_instant {
                    Some(prev) => now.duration_since(prev).as_secs_f32().min(0.25),
                    None => 0.0,
                };
                self.last_instant = Some(now);
                client.tick(event_loop, dt);
            }

            _ => {}
        }
    }
}
