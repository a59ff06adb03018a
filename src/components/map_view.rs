use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent, Window,
};
use yew::prelude::*;

use super::{camera_controls::CameraControls, entity_view::EntityView, status_panel::StatusPanel};
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::model::{EntityId, Position, WorldSnapshot};
use crate::render::{CanvasSurface, Overlay, render};
use crate::state::{Point, ViewportBounds, ViewportState, WheelMode, seers};

const PAN_STEP: f64 = 64.0;
const BUTTON_ZOOM: f64 = 1.25;

#[derive(Properties, PartialEq, Clone)]
pub struct MapViewProps {
    pub snapshot: UseReducerHandle<WorldSnapshot>,
    pub config: ViewerConfig,
}

/// Viewport values mirrored into yew state so the panels re-render.
#[derive(Clone, Debug, Default, PartialEq)]
struct ViewInfo {
    scale: f64,
    hover: Option<Position>,
    selected: Option<EntityId>,
    show_fog: bool,
}

impl ViewInfo {
    fn of(vp: &ViewportState) -> Self {
        Self {
            scale: vp.transform.scale,
            hover: vp.hover,
            selected: vp.current_selection(),
            show_fog: vp.show_fog,
        }
    }
}

/// Event listener that detaches itself when dropped.
struct Listener {
    target: EventTarget,
    event: &'static str,
    cb: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<E: JsCast + 'static>(
        target: &EventTarget,
        event: &'static str,
        mut handler: impl FnMut(E) + 'static,
    ) -> Result<Self, ViewerError> {
        let cb = Closure::wrap(
            Box::new(move |e: Event| handler(e.unchecked_into::<E>())) as Box<dyn FnMut(Event)>
        );
        target
            .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
            .map_err(|_| ViewerError::Listener(event))?;
        Ok(Self {
            target: target.clone(),
            event,
            cb,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.cb.as_ref().unchecked_ref());
    }
}

/// Everything the mount effect owns; dropping it tears the view down.
struct Mounted {
    window: Window,
    _listeners: Vec<Listener>,
    frame_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        // The frame callback holds the scheduler that holds the callback.
        self.frame_cb.borrow_mut().take();
    }
}

fn bounds_of(canvas: &HtmlCanvasElement) -> ViewportBounds {
    let rect = canvas.get_bounding_client_rect();
    ViewportBounds {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    }
}

fn client_point(e: &MouseEvent) -> Point {
    Point::new(e.client_x() as f64, e.client_y() as f64)
}

fn touch_points(list: &TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
        .collect()
}

fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0);
    canvas.set_width(width.max(0.0) as u32);
    canvas.set_height(height.max(0.0) as u32);
}

/// Centers the middle of the world. `false` until a grid is known.
fn center_on_world(vp: &mut ViewportState, snapshot: &WorldSnapshot, canvas: &HtmlCanvasElement) -> bool {
    let Some(grid) = snapshot.grid() else {
        return false;
    };
    vp.center_on(
        Position::new(grid.width / 2, grid.height / 2),
        canvas.width() as f64,
        canvas.height() as f64,
    );
    true
}

struct MountCtx {
    canvas: HtmlCanvasElement,
    viewport: Rc<RefCell<ViewportState>>,
    snapshot_ref: Rc<RefCell<UseReducerHandle<WorldSnapshot>>>,
    kick_ref: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
    centered: Rc<RefCell<bool>>,
    last_info: Rc<RefCell<ViewInfo>>,
    status: UseStateHandle<ViewInfo>,
}

fn mount(ctx: MountCtx) -> Result<Mounted, ViewerError> {
    let MountCtx {
        canvas,
        viewport,
        snapshot_ref,
        kick_ref,
        centered,
        last_info,
        status,
    } = ctx;
    let window = web_sys::window().ok_or(ViewerError::Dom("window"))?;

    fit_canvas(&window, &canvas);
    {
        let handle = snapshot_ref.borrow().clone();
        let mut vp = viewport.borrow_mut();
        *centered.borrow_mut() = center_on_world(&mut vp, &handle, &canvas);
        vp.request_redraw();
    }

    let draw: Rc<dyn Fn()> = {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let snapshot_ref = snapshot_ref.clone();
        Rc::new(move || {
            let handle = snapshot_ref.borrow().clone();
            let vp = viewport.borrow();
            match CanvasSurface::new(&canvas) {
                Ok(mut surface) => render(
                    &mut surface,
                    &handle,
                    &vp.transform,
                    &vp.selection,
                    Overlay {
                        hover: vp.hover,
                        show_fog: vp.show_fog,
                    },
                ),
                Err(err) => tracing::error!(%err, "skipping frame"),
            }
            let info = ViewInfo::of(&vp);
            if *last_info.borrow() != info {
                *last_info.borrow_mut() = info.clone();
                status.set(info);
            }
        })
    };

    // Frame driver: at most one RAF in flight, scheduled only while the
    // viewport has a pending redraw.
    let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let frame_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let kick: Rc<dyn Fn()> = {
        let window = window.clone();
        let viewport = viewport.clone();
        let raf_id = raf_id.clone();
        let frame_cb = frame_cb.clone();
        Rc::new(move || {
            if raf_id.get().is_some() || !viewport.borrow().frames.is_pending() {
                return;
            }
            if let Some(cb) = frame_cb.borrow().as_ref() {
                if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    raf_id.set(Some(id));
                }
            }
        })
    };
    {
        let viewport = viewport.clone();
        let raf_id = raf_id.clone();
        let kick = kick.clone();
        *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            raf_id.set(None);
            let dirty = viewport.borrow_mut().begin_frame();
            if dirty {
                draw();
            }
            kick();
        }) as Box<dyn FnMut()>));
    }
    *kick_ref.borrow_mut() = Some(kick.clone());

    let canvas_target: &EventTarget = canvas.as_ref();
    let window_target: &EventTarget = window.as_ref();
    let mut listeners = Vec::new();

    listeners.push(Listener::attach(canvas_target, "wheel", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let kick = kick.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let mode = WheelMode::from_dom(e.delta_mode());
            viewport
                .borrow_mut()
                .wheel(client_point(&e), &bounds_of(&canvas), e.delta_y(), mode);
            kick();
        }
    })?);

    listeners.push(Listener::attach(canvas_target, "mousedown", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let kick = kick.clone();
        move |e: MouseEvent| {
            e.prevent_default();
            viewport
                .borrow_mut()
                .pointer_down(e.button(), client_point(&e), &bounds_of(&canvas));
            kick();
        }
    })?);

    // Drags continue outside the canvas, so move and up go on the window.
    listeners.push(Listener::attach(window_target, "mousemove", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let snapshot_ref = snapshot_ref.clone();
        let kick = kick.clone();
        move |e: MouseEvent| {
            let bounds = bounds_of(&canvas);
            let at = client_point(&e);
            let handle = snapshot_ref.borrow().clone();
            let mut vp = viewport.borrow_mut();
            vp.pointer_move(at, &bounds);
            vp.hover_at(Some(at), &bounds, &handle);
            drop(vp);
            kick();
        }
    })?);

    listeners.push(Listener::attach(window_target, "mouseup", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let snapshot_ref = snapshot_ref.clone();
        let kick = kick.clone();
        move |_e: MouseEvent| {
            let handle = snapshot_ref.borrow().clone();
            viewport.borrow_mut().pointer_up(&bounds_of(&canvas), &handle);
            kick();
        }
    })?);

    listeners.push(Listener::attach(canvas_target, "mouseleave", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let snapshot_ref = snapshot_ref.clone();
        let kick = kick.clone();
        move |_e: MouseEvent| {
            let handle = snapshot_ref.borrow().clone();
            viewport.borrow_mut().hover_at(None, &bounds_of(&canvas), &handle);
            kick();
        }
    })?);

    listeners.push(Listener::attach(canvas_target, "contextmenu", |e: Event| {
        e.prevent_default();
    })?);

    listeners.push(Listener::attach(canvas_target, "touchstart", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let kick = kick.clone();
        move |e: TouchEvent| {
            e.prevent_default();
            viewport
                .borrow_mut()
                .touch_start(&touch_points(&e.touches()), &bounds_of(&canvas));
            kick();
        }
    })?);

    listeners.push(Listener::attach(canvas_target, "touchmove", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let kick = kick.clone();
        move |e: TouchEvent| {
            e.prevent_default();
            viewport
                .borrow_mut()
                .touch_move(&touch_points(&e.touches()), &bounds_of(&canvas));
            kick();
        }
    })?);

    listeners.push(Listener::attach(canvas_target, "touchend", {
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let snapshot_ref = snapshot_ref.clone();
        let kick = kick.clone();
        move |e: TouchEvent| {
            e.prevent_default();
            let handle = snapshot_ref.borrow().clone();
            viewport.borrow_mut().touch_end(
                &touch_points(&e.touches()),
                &bounds_of(&canvas),
                &handle,
            );
            kick();
        }
    })?);

    listeners.push(Listener::attach(canvas_target, "touchcancel", {
        let viewport = viewport.clone();
        let kick = kick.clone();
        move |_e: TouchEvent| {
            viewport.borrow_mut().cancel_gesture();
            kick();
        }
    })?);

    listeners.push(Listener::attach(window_target, "resize", {
        let window = window.clone();
        let canvas = canvas.clone();
        let viewport = viewport.clone();
        let kick = kick.clone();
        move |_e: Event| {
            fit_canvas(&window, &canvas);
            viewport.borrow_mut().request_redraw();
            kick();
        }
    })?);

    kick();
    tracing::info!(
        width = canvas.width(),
        height = canvas.height(),
        "map view mounted"
    );
    Ok(Mounted {
        window,
        _listeners: listeners,
        frame_cb,
        raf_id,
    })
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let viewport = use_mut_ref(|| ViewportState::new(&props.config));
    let snapshot_ref = use_mut_ref(|| props.snapshot.clone());
    let kick_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let centered = use_mut_ref(|| false);
    let last_info = use_mut_ref(ViewInfo::default);
    let status = use_state(ViewInfo::default);
    let entity_view = use_state(|| false);

    // Effect: swap in each new snapshot and repaint
    {
        let snapshot_ref = snapshot_ref.clone();
        let current = props.snapshot.clone();
        let viewport = viewport.clone();
        let kick_ref = kick_ref.clone();
        let centered = centered.clone();
        let canvas_ref = canvas_ref.clone();
        use_effect_with(props.snapshot.version, move |_| {
            *snapshot_ref.borrow_mut() = current.clone();
            {
                let mut vp = viewport.borrow_mut();
                if !*centered.borrow() {
                    if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                        *centered.borrow_mut() = center_on_world(&mut vp, &current, &canvas);
                    }
                }
                vp.request_redraw();
            }
            if let Some(kick) = &*kick_ref.borrow() {
                kick();
            }
            || ()
        });
    }

    // Main mount effect (listeners, frame driver)
    {
        let viewport = viewport.clone();
        let snapshot_ref = snapshot_ref.clone();
        let kick_ref = kick_ref.clone();
        let centered = centered.clone();
        let last_info = last_info.clone();
        let status = status.clone();
        let canvas_ref = canvas_ref.clone();
        use_effect_with((), move |_| {
            let mounted = canvas_ref
                .cast::<HtmlCanvasElement>()
                .ok_or(ViewerError::Dom("canvas"))
                .and_then(|canvas| {
                    mount(MountCtx {
                        canvas,
                        viewport,
                        snapshot_ref,
                        kick_ref: kick_ref.clone(),
                        centered,
                        last_info,
                        status,
                    })
                });
            if let Err(err) = &mounted {
                tracing::error!(%err, "map view setup failed");
            }
            move || {
                kick_ref.borrow_mut().take();
                drop(mounted);
            }
        });
    }

    // Camera buttons act on the canvas center.
    let with_viewport = |f: fn(&mut ViewportState, &HtmlCanvasElement)| {
        let viewport = viewport.clone();
        let kick_ref = kick_ref.clone();
        let canvas_ref = canvas_ref.clone();
        Callback::from(move |()| {
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                f(&mut viewport.borrow_mut(), &canvas);
            }
            if let Some(kick) = &*kick_ref.borrow() {
                kick();
            }
        })
    };
    let zoom_in_cb = with_viewport(|vp, canvas| {
        let center = Point::new(canvas.width() as f64 * 0.5, canvas.height() as f64 * 0.5);
        vp.zoom_at(center, BUTTON_ZOOM);
    });
    let zoom_out_cb = with_viewport(|vp, canvas| {
        let center = Point::new(canvas.width() as f64 * 0.5, canvas.height() as f64 * 0.5);
        vp.zoom_at(center, 1.0 / BUTTON_ZOOM);
    });
    let pan_left_cb = with_viewport(|vp, _| vp.pan(PAN_STEP, 0.0));
    let pan_right_cb = with_viewport(|vp, _| vp.pan(-PAN_STEP, 0.0));
    let pan_up_cb = with_viewport(|vp, _| vp.pan(0.0, PAN_STEP));
    let pan_down_cb = with_viewport(|vp, _| vp.pan(0.0, -PAN_STEP));
    let toggle_fog_cb = with_viewport(|vp, _| {
        vp.show_fog = !vp.show_fog;
        vp.request_redraw();
    });
    let reset_cb = {
        let snapshot_ref = snapshot_ref.clone();
        let viewport = viewport.clone();
        let kick_ref = kick_ref.clone();
        let canvas_ref = canvas_ref.clone();
        Callback::from(move |()| {
            let handle = snapshot_ref.borrow().clone();
            {
                let mut vp = viewport.borrow_mut();
                vp.reset_transform();
                if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                    center_on_world(&mut vp, &handle, &canvas);
                }
            }
            if let Some(kick) = &*kick_ref.borrow() {
                kick();
            }
        })
    };

    let toggle_entity_view_cb = {
        let entity_view = entity_view.clone();
        Callback::from(move |()| entity_view.set(!*entity_view))
    };
    let focus_cb = {
        let viewport = viewport.clone();
        let kick_ref = kick_ref.clone();
        let entity_view = entity_view.clone();
        Callback::from(move |id: EntityId| {
            {
                let mut vp = viewport.borrow_mut();
                vp.selection.select(Some(id));
                vp.request_redraw();
            }
            if let Some(kick) = &*kick_ref.borrow() {
                kick();
            }
            entity_view.set(false);
        })
    };

    // Panel contents
    let snapshot = &*props.snapshot;
    let step = snapshot.dynamic.as_ref().map(|d| d.step);
    let hover_lines = status
        .hover
        .map(|cell| snapshot.describe_cell(cell))
        .unwrap_or_default();
    let hover_seers: Vec<String> = status
        .hover
        .map(|cell| {
            seers(snapshot.entities(), cell)
                .into_iter()
                .map(|e| e.name.clone())
                .collect()
        })
        .unwrap_or_default();
    let selected = status.selected.and_then(|id| snapshot.entity(id)).cloned();

    html! {<div style="position:relative; width:100vw; height:100vh; overflow:hidden;">
        <canvas ref={canvas_ref.clone()} id="map-canvas" style="display:block; width:100%; height:100%; touch-action:none;"></canvas>
        if *entity_view {
            <EntityView
                snapshot={props.snapshot.clone()}
                config={props.config.clone()}
                selected={status.selected}
                on_focus={focus_cb}
            />
        } else {
            <StatusPanel
                step={step}
                scale={status.scale}
                hover={status.hover}
                hover_lines={hover_lines}
                hover_seers={hover_seers}
                selected={selected}
            />
        }
        <CameraControls
            on_zoom_in={zoom_in_cb}
            on_zoom_out={zoom_out_cb}
            on_pan_left={pan_left_cb}
            on_pan_right={pan_right_cb}
            on_pan_up={pan_up_cb}
            on_pan_down={pan_down_cb}
            on_reset={reset_cb}
            on_toggle_fog={toggle_fog_cb}
            fog_on={status.show_fog}
            on_toggle_entity_view={toggle_entity_view_cb}
            entity_view_on={*entity_view}
        />
    </div> }
}
