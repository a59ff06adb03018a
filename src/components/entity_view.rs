use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use crate::config::ViewerConfig;
use crate::model::{Entity, EntityId, WorldSnapshot};
use crate::render::{CanvasSurface, Overlay, Surface, render, style};
use crate::state::ViewportState;
use crate::util::compare_entity;

/// Edge length of each per-entity map, in pixels.
pub const ENTITY_MAP_SIZE: u32 = 250;

#[derive(Properties, PartialEq, Clone)]
pub struct EntityViewProps {
    pub snapshot: UseReducerHandle<WorldSnapshot>,
    pub config: ViewerConfig,
    /// Entity selected on the global map.
    pub selected: Option<EntityId>,
    /// Header click: select on the global map and go back to it.
    pub on_focus: Callback<EntityId>,
}

fn header(e: &Entity) -> String {
    format!("{} ({}|{})", e.name, e.pos.x, e.pos.y)
}

fn meta_lines(e: &Entity) -> Vec<String> {
    let mut lines = vec![format!(
        "role = {}, energy = {}{}",
        e.role,
        e.energy,
        if e.deactivated { " (deactivated)" } else { "" }
    )];
    if !e.action.is_empty() {
        lines.push(format!("{}(…) = {}", e.action, e.action_result));
    }
    lines
}

/// Paints the view-only map that follows `entity`.
fn draw_focused<S: Surface>(
    surface: &mut S,
    snapshot: &WorldSnapshot,
    entity: &Entity,
    cfg: &ViewerConfig,
) {
    let (width, _) = surface.size();
    let vp = ViewportState::focused_on(cfg, entity, width);
    let overlay = Overlay {
        hover: None,
        show_fog: vp.show_fog,
    };
    render(surface, snapshot, &vp.transform, &vp.selection, overlay);
}

#[derive(Properties, PartialEq, Clone)]
struct EntityMapProps {
    snapshot: UseReducerHandle<WorldSnapshot>,
    config: ViewerConfig,
    entity: Entity,
    highlighted: bool,
    on_focus: Callback<EntityId>,
}

#[function_component(EntityMap)]
fn entity_map(props: &EntityMapProps) -> Html {
    let canvas_ref = use_node_ref();

    // Effect: repaint whenever the snapshot or the entity changes
    {
        let canvas_ref = canvas_ref.clone();
        let snapshot = props.snapshot.clone();
        let config = props.config.clone();
        let entity = props.entity.clone();
        use_effect_with((props.snapshot.version, props.entity.clone()), move |_| {
            if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                match CanvasSurface::new(&canvas) {
                    Ok(mut surface) => draw_focused(&mut surface, &snapshot, &entity, &config),
                    Err(err) => tracing::error!(%err, entity = entity.id, "entity map skipped"),
                }
            }
            || ()
        });
    }

    let e = &props.entity;
    let header_style = if props.highlighted {
        "background:white; color:black;".to_string()
    } else {
        let team = style::team(props.snapshot.team_index(&e.team));
        format!("background:{team}; color:white;")
    };
    let onclick = {
        let on_focus = props.on_focus.clone();
        let id = e.id;
        Callback::from(move |_: MouseEvent| on_focus.emit(id))
    };
    let size = ENTITY_MAP_SIZE.to_string();

    html! {<div style="display:flex; flex-direction:column; gap:4px; width:250px;">
        <a style={format!("{header_style} display:block; padding:2px 6px; cursor:pointer; font-weight:600;")} onclick={onclick}>
            { header(e) }
        </a>
        <canvas ref={canvas_ref} width={size.clone()} height={size}></canvas>
        <div style="font-size:12px; color:#e6edf3;">
            { for meta_lines(e).into_iter().map(|line| html! { <div>{ line }</div> }) }
        </div>
    </div>}
}

#[function_component(EntityView)]
pub fn entity_view(props: &EntityViewProps) -> Html {
    let mut entities: Vec<&Entity> = props.snapshot.entities().iter().collect();
    entities.sort_by(|a, b| compare_entity(a, b));

    html! {<div style="position:absolute; inset:0; overflow:auto; background:#0d1117; padding:12px 12px 72px; display:flex; flex-wrap:wrap; gap:12px; align-content:flex-start;">
        { for entities.into_iter().map(|e| html! {
            <EntityMap
                key={e.id.to_string()}
                snapshot={props.snapshot.clone()}
                config={props.config.clone()}
                entity={e.clone()}
                highlighted={props.selected == Some(e.id)}
                on_focus={props.on_focus.clone()}
            />
        }) }
    </div>}
}
