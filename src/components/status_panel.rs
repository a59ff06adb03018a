use yew::prelude::*;

use crate::model::{Entity, Position};

#[derive(Properties, PartialEq, Clone)]
pub struct StatusPanelProps {
    pub step: Option<i64>,
    /// Pixels per cell.
    pub scale: f64,
    pub hover: Option<Position>,
    #[prop_or_default]
    pub hover_lines: Vec<String>,
    /// Names of entities that can see the hovered cell.
    #[prop_or_default]
    pub hover_seers: Vec<String>,
    #[prop_or_default]
    pub selected: Option<Entity>,
}

fn entity_summary(e: &Entity) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Entity", format!("{} ({})", e.name, e.team)),
        ("Position", format!("({}, {})", e.pos.x, e.pos.y)),
        ("Energy", e.energy.to_string()),
        ("Vision", e.vision.to_string()),
    ];
    if !e.role.is_empty() {
        rows.push(("Role", e.role.clone()));
    }
    if !e.action.is_empty() {
        let params = if e.action_params.is_empty() {
            String::new()
        } else {
            format!("({})", e.action_params.join(", "))
        };
        rows.push(("Action", format!("{}{} = {}", e.action, params, e.action_result)));
    }
    if e.deactivated {
        rows.push(("State", "deactivated".into()));
    }
    rows
}

#[function_component]
pub fn StatusPanel(props: &StatusPanelProps) -> Html {
    let row_style = "display:flex; align-items:baseline; gap:8px;"; // label | value
    let label_style = "flex:1; font-weight:500; color:#8b949e;";
    let value_style = "text-align:right; font-variant-numeric:tabular-nums; font-weight:600;";
    let row = |label: &str, value: String| {
        html! {
            <div style={row_style}>
                <span style={label_style}>{ label.to_string() }</span>
                <span style={value_style}>{ value }</span>
            </div>
        }
    };

    let step = props.step.map_or("-".to_string(), |s| s.to_string());
    let zoom = format!("{:.0} px/cell", props.scale);
    let hover = props.hover.map(|cell| {
        let contents = if props.hover_lines.is_empty() {
            "empty".to_string()
        } else {
            props.hover_lines.join(", ")
        };
        let seen_by = if props.hover_seers.is_empty() {
            "nobody".to_string()
        } else {
            props.hover_seers.join(", ")
        };
        html! {<>
            { row("Cell", format!("({}, {})", cell.x, cell.y)) }
            { row("Contents", contents) }
            { row("Seen by", seen_by) }
        </>}
    });
    let selected = props.selected.as_ref().map(|e| {
        entity_summary(e)
            .into_iter()
            .map(|(label, value)| row(label, value))
            .collect::<Html>()
    });

    html! {
        <div style="position:absolute; top:12px; left:12px; background:rgba(22,27,34,0.9); color:#e6edf3; border:1px solid #30363d; border-radius:8px; padding:10px 14px; min-width:230px; max-width:320px; display:flex; flex-direction:column; gap:6px; font-size:14px;">
            { row("Step", step) }
            { row("Zoom", zoom) }
            { for hover }
            if let Some(selected) = selected {
                <div style="border-top:1px solid #30363d; margin-top:4px; padding-top:6px; display:flex; flex-direction:column; gap:6px;">
                    { selected }
                </div>
            }
        </div>
    }
}
