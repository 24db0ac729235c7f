use gridatlas_shared::{DatasetKind, LoadStatus, MapView};
use leptos::prelude::*;

/// Short status suffix shown next to an overlay name.
fn status_label(status: &LoadStatus) -> String {
    match status {
        LoadStatus::Pending => "loading…".to_owned(),
        LoadStatus::Loaded { admitted, .. } => format!("{admitted}"),
        LoadStatus::Failed(_) => "failed".to_owned(),
    }
}

/// Base layer radios and overlay checkboxes.
#[component]
pub fn LayerControlPanel() -> impl IntoView {
    let map_view: RwSignal<MapView> = expect_context();

    let (base_names, overlays) = map_view.with_untracked(|view| {
        let bases: Vec<String> = view
            .control
            .base_layers()
            .iter()
            .map(|b| b.name.clone())
            .collect();
        let overlays: Vec<(DatasetKind, String)> = view
            .control
            .overlays()
            .iter()
            .map(|o| (o.kind, o.title.clone()))
            .collect();
        (bases, overlays)
    });

    view! {
        <div style="position: absolute; top: 10px; right: 10px; z-index: 10; background: #ffffff; border-radius: 5px; box-shadow: 0 1px 5px rgba(0,0,0,0.4); padding: 6px 10px 6px 6px; font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 12px; color: #333333; line-height: 1.6;">
            <div>
                {base_names.into_iter().enumerate().map(|(index, name)| {
                    let on_change = move |_| {
                        map_view.update(|view| {
                            view.control.select_base(index);
                        });
                    };
                    view! {
                        <label style="display: block; cursor: pointer;">
                            <input
                                type="radio"
                                name="gridatlas-base-layer"
                                prop:checked=move || map_view.with(|view| view.control.active_base_index() == index)
                                on:change=on_change
                            />
                            " " {name}
                        </label>
                    }
                }).collect_view()}
            </div>
            <div style="border-top: 1px solid #dddddd; margin: 5px 0;" />
            <div>
                {overlays.into_iter().map(|(kind, title)| {
                    let on_change = move |_| {
                        map_view.update(|view| {
                            view.control.toggle_overlay(kind);
                        });
                    };
                    let status = move || {
                        map_view.with(|view| {
                            view.overlay(kind)
                                .map(|o| status_label(&o.layer.status))
                                .unwrap_or_default()
                        })
                    };
                    let failure = move || {
                        map_view.with(|view| match view.overlay(kind).map(|o| &o.layer.status) {
                            Some(LoadStatus::Failed(reason)) => reason.clone(),
                            _ => String::new(),
                        })
                    };
                    view! {
                        <label style="display: block; cursor: pointer;" title=failure>
                            <input
                                type="checkbox"
                                prop:checked=move || map_view.with(|view| view.control.is_visible(kind))
                                on:change=on_change
                            />
                            " " {title}
                            <span style="color: #888888; margin-left: 4px; font-size: 11px;">"(" {status} ")"</span>
                        </label>
                    }
                }).collect_view()}
            </div>
        </div>
    }
}
