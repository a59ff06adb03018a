use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraControlsProps {
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_pan_left: Callback<()>,
    pub on_pan_right: Callback<()>,
    pub on_pan_up: Callback<()>,
    pub on_pan_down: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_toggle_fog: Callback<()>,
    pub fog_on: bool,
    pub on_toggle_entity_view: Callback<()>,
    pub entity_view_on: bool,
}

fn click(cb: &Callback<()>) -> Callback<MouseEvent> {
    let cb = cb.clone();
    Callback::from(move |_| cb.emit(()))
}

#[function_component(CameraControls)]
pub fn camera_controls(props: &CameraControlsProps) -> Html {
    let fog_label = if props.fog_on { "Fog: on" } else { "Fog: off" };
    let view_label = if props.entity_view_on {
        "Global view"
    } else {
        "Entity view"
    };
    html! {<div style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center;">
        <button onclick={click(&props.on_toggle_entity_view)}> { view_label } </button>
        // Camera buttons only act on the global map.
        if !props.entity_view_on {
            <span style="width:8px;"></span>
            <button title="Zoom out" onclick={click(&props.on_zoom_out)}> {"-"} </button>
            <button title="Zoom in" onclick={click(&props.on_zoom_in)}> {"+"} </button>
            <span style="width:8px;"></span>
            <button onclick={click(&props.on_pan_left)}> {"←"} </button>
            <button onclick={click(&props.on_pan_up)}> {"↑"} </button>
            <button onclick={click(&props.on_pan_down)}> {"↓"} </button>
            <button onclick={click(&props.on_pan_right)}> {"→"} </button>
            <span style="width:8px;"></span>
            <button onclick={click(&props.on_reset)}> {"Reset zoom"} </button>
            <button onclick={click(&props.on_toggle_fog)}> { fog_label } </button>
        }
    </div>}
}
