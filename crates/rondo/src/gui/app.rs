use crate::config;
use crate::events::AppEvent;
use crate::gui::theme::{self, ThemeColors};
use crate::gui::wheel::{self, State};
use crate::gui::window;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use rondo_wheel::{Point, Selection};
use std::cell::RefCell;
use std::rc::Rc;

pub struct AppModel {
    pub state: Rc<RefCell<State>>,
    pub visible: bool,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Toggle,
    DragBegin(Point),
    DragMove(Point),
    DragEnd,
    Tap(Point),
    FrameTick,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::Toggle => AppMsg::Toggle,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (State, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Rondo"),
            #[watch]
            set_visible: model.visible,
            #[watch]
            set_opacity: if model.visible { 1.0 } else { 0.0 },
            add_css_class: "rondo-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Hide);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "overlay"]
            gtk::Overlay {
                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                    add_css_class: "rondo-drawing-area",

                    add_controller = gtk::GestureDrag {
                        connect_drag_begin[sender] => move |_, x, y| {
                            sender.input(AppMsg::DragBegin(Point::new(x, y)));
                        },
                        connect_drag_update[sender] => move |gesture, dx, dy| {
                            if let Some((sx, sy)) = gesture.start_point() {
                                sender.input(AppMsg::DragMove(Point::new(sx + dx, sy + dy)));
                            }
                        },
                        connect_drag_end[sender] => move |_, _, _| {
                            sender.input(AppMsg::DragEnd);
                        }
                    },

                    add_controller = gtk::GestureClick {
                        set_button: 1,
                        connect_released[sender] => move |_, _, x, y| {
                            sender.input(AppMsg::Tap(Point::new(x, y)));
                        }
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, rx) = init;

        theme::load_css();
        window::init_layer_shell(&root);

        let state = Rc::new(RefCell::new(state));

        let model = AppModel {
            state: state.clone(),
            visible: false,
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                let mut state = state_draw.borrow_mut();
                state.set_viewport(width as f64, height as f64);
                if let Err(e) = wheel::draw(cr, &state, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        // Frame driver for release inertia. The engine ignores ticks with
        // no active spin, so the permanent callback is harmless.
        let tick_sender = sender.clone();
        widgets.drawing_area.add_tick_callback(move |_, _| {
            tick_sender.input(AppMsg::FrameTick);
            glib::ControlFlow::Continue
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => {
                self.visible = true;
                self.drawing_area.queue_draw();
            }
            AppMsg::Hide => {
                self.visible = false;
            }
            AppMsg::Toggle => {
                if self.visible {
                    sender.input(AppMsg::Hide);
                } else {
                    sender.input(AppMsg::Show);
                }
            }
            AppMsg::DragBegin(point) => {
                if !self.visible {
                    return;
                }
                let update = self.state.borrow_mut().begin_drag(point);
                if update.redraw {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::DragMove(point) => {
                if !self.visible {
                    return;
                }
                let update = self.state.borrow_mut().drag_to(point);
                if update.top_changed {
                    log::debug!("top item: {:?}", self.state.borrow().wheel.top_index());
                }
                if update.redraw {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::DragEnd => {
                if !self.visible {
                    return;
                }
                self.state.borrow_mut().end_drag();
            }
            AppMsg::Tap(point) => {
                if !self.visible {
                    return;
                }
                let selection = {
                    let mut state = self.state.borrow_mut();
                    state.tap_target(point).and_then(|i| state.commit_tap(i))
                };
                if let Some(selection) = selection {
                    self.activate(selection);
                }
            }
            AppMsg::FrameTick => {
                if !self.visible {
                    return;
                }
                let update = self.state.borrow_mut().tick();
                if update.top_changed {
                    log::debug!("top item: {:?}", self.state.borrow().wheel.top_index());
                }
                if update.redraw {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.state.borrow_mut().rebuild(&new_config);
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn activate(&mut self, selection: Selection) {
        match selection {
            Selection::Item(index) => {
                let exec = {
                    let state = self.state.borrow();
                    state.item_at(index).and_then(|item| item.exec.clone())
                };
                match exec {
                    Some(exec) if exec.as_str() == config::SETUP_EXEC => open_config(),
                    Some(exec) if !exec.is_empty() => spawn_command(exec.as_str()),
                    _ => log::warn!("Item {} has no command configured", index),
                }
            }
            Selection::Overflow => open_config(),
        }
        self.visible = false;
    }
}

fn open_config() {
    match config::write_default_config() {
        Ok(path) => {
            if let Err(e) = std::process::Command::new("xdg-open").arg(&path).spawn() {
                log::error!("Failed to open config: {}", e);
            }
        }
        Err(e) => log::error!("Failed to write default config: {}", e),
    }
}

fn spawn_command(exec: &str) {
    let args = match shell_words::split(exec) {
        Ok(args) if !args.is_empty() => args,
        Ok(_) => return,
        Err(e) => {
            log::error!("Bad command '{}': {}", exec, e);
            return;
        }
    };
    if let Err(e) = std::process::Command::new(&args[0])
        .args(&args[1..])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        log::error!("Failed to run '{}': {}", exec, e);
    }
}
