use gridatlas_shared::{LoadError, SiteScore};
use leptos::prelude::*;

use crate::app::{SelectedFeature, SiteProbe};
use crate::viewport::Viewport;

const POPUP_STYLE: &str = "position: absolute; z-index: 20; transform: translate(-50%, calc(-100% - 12px)); background: #ffffff; border-radius: 8px; box-shadow: 0 3px 14px rgba(0,0,0,0.4); padding: 10px 26px 10px 12px; font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 13px; color: #333333; white-space: nowrap; pointer-events: auto;";
const CLOSE_STYLE: &str = "position: absolute; top: 4px; right: 6px; border: none; background: none; color: #757575; font-size: 16px; cursor: pointer; line-height: 1;";

fn score_lines(score: &SiteScore) -> Vec<(&'static str, String)> {
    vec![
        ("Generation", format!("{:.1}", score.station)),
        ("Substations", format!("{:.1}", score.substation)),
        ("Lines", format!("{:.1}", score.line)),
        ("Total", format!("{:.1}", score.total)),
    ]
}

/// Popup for the clicked feature, pinned to its anchor as the map moves.
#[component]
pub fn FeaturePopupView() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let SelectedFeature(selected) = expect_context();

    move || {
        selected.get().map(|popup| {
            let anchor = popup.anchor;
            let position = move || {
                let (x, y) = viewport.with(|vp| vp.lat_lng_to_screen(anchor));
                format!("{POPUP_STYLE} left: {x}px; top: {y}px;")
            };
            view! {
                <div style=position>
                    <button style=CLOSE_STYLE on:click=move |_| selected.set(None)>"×"</button>
                    <div style="color: #757575; font-size: 11px; margin-bottom: 4px;">{popup.title}</div>
                    {popup.content.lines.into_iter().map(|line| view! {
                        <div>
                            <b>{line.label}</b>
                            ": "
                            {line.value}
                        </div>
                    }).collect_view()}
                </div>
            }
        })
    }
}

/// Suitability score for the right-clicked location.
#[component]
pub fn SiteScorePopup() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let SiteProbe(probe) = expect_context();

    move || {
        probe.get().map(|state| {
            let site = state.site;
            let position = move || {
                let (x, y) = viewport.with(|vp| vp.lat_lng_to_screen(site));
                format!("{POPUP_STYLE} left: {x}px; top: {y}px;")
            };
            let body = match state.result {
                None => view! { <div style="color: #888888;">"Scoring…"</div> }.into_any(),
                Some(Err(LoadError::Http(503))) => {
                    view! { <div style="color: #888888;">"Datasets are still loading"</div> }
                        .into_any()
                }
                Some(Err(e)) => view! { <div style="color: #c0392b;">{e.to_string()}</div> }.into_any(),
                Some(Ok(score)) => score_lines(&score)
                    .into_iter()
                    .map(|(label, value)| view! {
                        <div>
                            <b>{label}</b>
                            ": "
                            {value}
                        </div>
                    })
                    .collect_view()
                    .into_any(),
            };
            view! {
                <div style=position>
                    <button style=CLOSE_STYLE on:click=move |_| probe.set(None)>"×"</button>
                    <div style="color: #757575; font-size: 11px; margin-bottom: 4px;">
                        {format!("{:.4}, {:.4}", site.lat, site.lng)}
                    </div>
                    {body}
                </div>
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_lines_round_to_one_decimal() {
        let score = SiteScore {
            lat: -35.0,
            lon: 147.0,
            station: 7.06,
            substation: 331.36,
            line: 100.0,
            total: 438.42,
        };
        let lines = score_lines(&score);
        assert_eq!(lines[0], ("Generation", "7.1".to_owned()));
        assert_eq!(lines[3], ("Total", "438.4".to_owned()));
    }
}
