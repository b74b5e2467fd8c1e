//! main.rs - Desktop host for the spice particle field
//! Owns the window, the clock and the input; the field owns the particles

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::{Rgb565, Rgb888},
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use spice_field::{Bounds, ParticleField, ParticleId, RenderSink, Rgba, Settings, Visual};

const SCREEN_WIDTH: i32 = 320;
const SCREEN_HEIGHT: i32 = 170;
const POOL: usize = 64;

/// Container sizes cycled with S, standing in for window resizes.
const CONTAINER_SIZES: [(f32, f32); 3] = [(320.0, 150.0), (240.0, 110.0), (160.0, 80.0)];

/// Particles released by the transmission key.
const TRANSMIT_COUNT: usize = 10;

/// Lifecycle counters fed by the field's create/dispose signals.
#[derive(Default)]
struct Stats {
    created: u64,
    disposed: u64,
}

impl RenderSink for Stats {
    fn create(&mut self, _id: ParticleId, _visual: &Visual) {
        self.created += 1;
    }

    fn dispose(&mut self, _id: ParticleId) {
        self.disposed += 1;
    }
}

/// Paints every update straight into the frame being built.
struct DisplaySink<'a> {
    display: &'a mut SimulatorDisplay<Rgb565>,
    stats: &'a mut Stats,
    glow: f32,
}

impl RenderSink for DisplaySink<'_> {
    fn create(&mut self, id: ParticleId, visual: &Visual) {
        self.stats.create(id, visual);
    }

    fn update(&mut self, _id: ParticleId, visual: &Visual) {
        let center = Point::new(visual.x as i32, visual.y as i32);
        let alpha = visual.opacity * visual.color.a as f32 / 255.0;

        if self.glow > 0.0 {
            let halo = (visual.size * (1.0 + self.glow)) as u32;
            Circle::with_center(center, halo.max(1))
                .into_styled(PrimitiveStyle::with_stroke(shade(visual.color, alpha * self.glow * 0.5), 1))
                .draw(self.display)
                .unwrap();
        }

        Circle::with_center(center, (visual.size as u32).max(1))
            .into_styled(PrimitiveStyle::with_fill(shade(visual.color, alpha)))
            .draw(self.display)
            .unwrap();
    }

    fn dispose(&mut self, id: ParticleId) {
        self.stats.dispose(id);
    }
}

/// Palette color faded towards the black background.
fn shade(color: Rgba, alpha: f32) -> Rgb565 {
    let k = alpha.clamp(0.0, 1.0);
    Rgb565::from(Rgb888::new(
        (color.r as f32 * k) as u8,
        (color.g as f32 * k) as u8,
        (color.b as f32 * k) as u8,
    ))
}

fn render_hud(display: &mut SimulatorDisplay<Rgb565>, field: &ParticleField<POOL>, stats: &Stats) {
    let text_color = Rgb565::new(0, 31, 63);
    let bounds = field.bounds();

    // Container outline
    Rectangle::new(Point::zero(), Size::new(bounds.width as u32, bounds.height as u32))
        .into_styled(PrimitiveStyle::with_stroke(Rgb565::new(0, 10, 15), 1))
        .draw(display)
        .unwrap();

    let style = MonoTextStyle::new(&FONT_6X10, text_color);

    let status = format!(
        "Live: {}/{}  R: {:.0}  +{} -{}",
        field.len(),
        field.capacity(),
        field.interaction_radius(),
        stats.created,
        stats.disposed,
    );
    Text::with_baseline(&status, Point::new(5, 5), style, Baseline::Top)
        .draw(display)
        .unwrap();

    if field.pending_burst() > 0 {
        let burst = format!("Transmitting: {}", field.pending_burst());
        Text::with_baseline(&burst, Point::new(SCREEN_WIDTH - 100, 5), style, Baseline::Top)
            .draw(display)
            .unwrap();
    }

    let instructions_style = MonoTextStyle::new(&FONT_6X10, Rgb565::new(0, 20, 40));
    Text::with_baseline(
        "A/R: Add/Remove | T: Transmit | +/-: Radius | S: Size | Q",
        Point::new(5, SCREEN_HEIGHT - 12),
        instructions_style,
        Baseline::Top,
    )
    .draw(display)
    .unwrap();
}

fn main() {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42);
    let settings = Settings { rng_seed: seed, ..Settings::default() };
    let glow = settings.glow_intensity;

    let mut display = SimulatorDisplay::new(Size::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32));
    let output_settings = OutputSettingsBuilder::new().scale(3).build();
    let mut window = Window::new("Spice - Particle Field", &output_settings);

    let start = Instant::now();
    let clock = || start.elapsed().as_secs_f64() * 1000.0;

    let mut stats = Stats::default();
    let mut size_index = 0;
    let (width, height) = CONTAINER_SIZES[size_index];
    let mut field: ParticleField<POOL> =
        match ParticleField::new(settings, Bounds::new(width, height), clock(), &mut stats) {
            Ok(field) => field,
            Err(e) => {
                eprintln!("spice: {}", e);
                return;
            }
        };

    let target_fps = 60;
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps as f32);

    println!("=== Spice - Particle Field ===");
    println!("Controls:");
    println!("  Mouse: Repel particles");
    println!("  A / R: Add / remove a particle");
    println!("  T: Transmission burst ({} particles)", TRANSMIT_COUNT);
    println!("  + / -: Grow / shrink pointer radius");
    println!("  S: Cycle container size");
    println!("  L: Pointer leave");
    println!("  Q: Quit");

    'main_loop: loop {
        let frame_start = Instant::now();

        display.clear(Rgb565::BLACK).unwrap();
        {
            let mut sink = DisplaySink { display: &mut display, stats: &mut stats, glow };
            field.tick(clock(), &mut sink);
        }
        render_hud(&mut display, &field, &stats);
        window.update(&display);

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'main_loop,
                SimulatorEvent::MouseMove { point } => {
                    let bounds = field.bounds();
                    let inside = point.x >= 0
                        && point.y >= 0
                        && (point.x as f32) <= bounds.width
                        && (point.y as f32) <= bounds.height;

                    match (inside, field.pointer().is_hovering()) {
                        (true, false) => field.pointer_enter(),
                        (false, true) => field.pointer_leave(),
                        _ => {}
                    }
                    field.pointer_move(point.x as f32, point.y as f32);
                }
                SimulatorEvent::KeyDown { keycode, .. } => {
                    let key = format!("{:?}", keycode).to_lowercase();
                    match key.as_str() {
                        "a" => {
                            field.controls(&mut stats).add_particle();
                        }
                        "r" => {
                            field.controls(&mut stats).remove_particle();
                        }
                        "t" => {
                            field.controls(&mut stats).transmit(TRANSMIT_COUNT);
                            println!("Transmitting {} particles", TRANSMIT_COUNT);
                        }
                        "equals" | "plus" | "kpplus" => {
                            let radius = field.interaction_radius() + 5.0;
                            field.controls(&mut stats).set_collision_radius(radius);
                            println!("Pointer radius: {:.0}", field.interaction_radius());
                        }
                        "minus" | "kpminus" => {
                            let radius = field.interaction_radius() - 5.0;
                            field.controls(&mut stats).set_collision_radius(radius);
                            println!("Pointer radius: {:.0}", field.interaction_radius());
                        }
                        "s" => {
                            size_index = (size_index + 1) % CONTAINER_SIZES.len();
                            let (width, height) = CONTAINER_SIZES[size_index];
                            field.set_bounds(width, height);
                            println!("Container: {}x{}", width, height);
                        }
                        "l" => field.pointer_leave(),
                        "q" => break 'main_loop,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Frame rate limiting
        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    println!("Particles created: {}, retired: {}", stats.created, stats.disposed);
}
