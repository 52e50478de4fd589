use crate::config::{Config, ExecCommand, IconName, ItemConfig, ItemLabel};
use crate::gui::wheel::{
    DEAD_ZONE_RADIUS, ICON_SIZE, REFERENCE_HEIGHT, TAP_SLACK, WHEEL_RADIUS,
};
use gdk_pixbuf::Pixbuf;
use parking_lot::RwLock;
use rondo_wheel::{Point, Selection, SlotPosition, Wheel, WheelParams, WheelUpdate};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

/// One ring entry: what to show and what committing it runs.
#[derive(Clone)]
pub struct WheelItem {
    pub label: ItemLabel,
    pub exec: Option<ExecCommand>,
    pub pixbuf: Option<Pixbuf>,
}

impl WheelItem {
    pub fn from_config(cfg: &ItemConfig) -> Self {
        let pixbuf = cfg.icon.as_ref().and_then(Self::load_icon);
        Self {
            label: cfg.label.clone(),
            exec: cfg.exec.clone(),
            pixbuf,
        }
    }

    fn load_icon(icon: &IconName) -> Option<Pixbuf> {
        let path = find_icon_path(icon)?;
        Pixbuf::from_file_at_scale(&path, ICON_SIZE, ICON_SIZE, true).ok()
    }

    pub fn is_broken(&self) -> bool {
        self.exec.as_ref().map(|e| e.is_empty()).unwrap_or(true)
    }
}

static ICON_PATHS: OnceLock<RwLock<HashMap<String, Option<PathBuf>>>> = OnceLock::new();

/// Theme lookups walk the icon dirs on every call; cache per icon name.
fn find_icon_path(icon_name: &IconName) -> Option<PathBuf> {
    if icon_name.is_empty() {
        return None;
    }

    let path = Path::new(icon_name.as_ref());
    if path.is_absolute() && path.exists() {
        return Some(path.to_path_buf());
    }

    let cache = ICON_PATHS.get_or_init(|| RwLock::new(HashMap::new()));
    if let Some(cached) = cache.read().get(icon_name.as_ref()) {
        return cached.clone();
    }

    let resolved = freedesktop_icons::lookup(icon_name.as_ref())
        .with_size(512)
        .with_scale(1)
        .find();
    cache
        .write()
        .insert(icon_name.to_string(), resolved.clone());
    resolved
}

/// Everything the wheel screen needs: the engine state plus the item
/// payloads and viewport geometry. Owned by the relm4 component behind an
/// `Rc<RefCell<_>>`; all mutation happens on the main thread.
pub struct State {
    pub center: Point,
    pub scale_factor: f64,
    pub items: Vec<WheelItem>,
    pub wheel: Wheel,
    started: Instant,
}

impl State {
    pub fn new(config: &Config) -> Self {
        let params = config.wheel.params().unwrap_or_else(|e| {
            log::error!("Invalid wheel parameters, using defaults: {}", e);
            WheelParams::default()
        });
        let items: Vec<WheelItem> = config.items.iter().map(WheelItem::from_config).collect();
        let wheel = Wheel::new(items.len(), config.wheel.overflow, params);
        Self {
            center: Point::default(),
            scale_factor: 1.0,
            items,
            wheel,
            started: Instant::now(),
        }
    }

    /// Swaps in reloaded config. The ring is rebuilt, so any rotation or
    /// in-flight inertia is discarded.
    pub fn rebuild(&mut self, config: &Config) {
        let fresh = Self::new(config);
        self.items = fresh.items;
        self.wheel = fresh.wheel;
    }

    /// Milliseconds since startup; feeds the engine's sample timestamps.
    pub fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Recomputed from the drawing area on every draw; the overlay spans
    /// the monitor, so the viewport height doubles as the monitor height.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.center = Point::new(width / 2.0, height / 2.0);
        self.scale_factor = if height > 0.0 {
            height / REFERENCE_HEIGHT
        } else {
            1.0
        };
    }

    pub fn radius(&self) -> f64 {
        WHEEL_RADIUS * self.scale_factor
    }

    pub fn slot_geometry(&self, index: usize) -> SlotPosition {
        self.wheel.slot_position(index, self.radius(), self.center)
    }

    pub fn item_at(&self, index: usize) -> Option<&WheelItem> {
        self.items.get(index)
    }

    /// Slot under a tap, if the tap lands in the ring band. Inside the dead
    /// zone and beyond the outer slack nothing is hit.
    pub fn tap_target(&self, pointer: Point) -> Option<usize> {
        let dist = self.distance_from_center(pointer);
        if dist <= DEAD_ZONE_RADIUS * self.scale_factor {
            return None;
        }
        if dist > self.radius() + TAP_SLACK * self.scale_factor {
            return None;
        }
        self.wheel.nearest_slot(pointer, self.center)
    }

    fn distance_from_center(&self, pointer: Point) -> f64 {
        let (dx, dy) = (pointer.x - self.center.x, pointer.y - self.center.y);
        dx.hypot(dy)
    }

    pub fn begin_drag(&mut self, pointer: Point) -> WheelUpdate {
        let now = self.now_ms();
        self.wheel.begin_drag(self.center, pointer, now)
    }

    pub fn drag_to(&mut self, pointer: Point) -> WheelUpdate {
        let now = self.now_ms();
        self.wheel.drag_to(pointer, now)
    }

    pub fn end_drag(&mut self) -> WheelUpdate {
        self.wheel.end_drag()
    }

    pub fn tick(&mut self) -> WheelUpdate {
        self.wheel.tick()
    }

    pub fn commit_tap(&mut self, index: usize) -> Option<Selection> {
        self.wheel.commit_tap(index)
    }
}
