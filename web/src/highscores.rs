use concentration_core::LedgerRow;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct HighscoresProps {
    pub rows: Vec<LedgerRow>,
    #[prop_or_default]
    pub can_share: bool,
    pub on_share: Callback<()>,
}

#[function_component]
pub(crate) fn HighscoresView(props: &HighscoresProps) -> Html {
    if props.rows.is_empty() {
        return html! {
            <section class="highscores">
                <p class="empty-message">{"No games completed yet. Start playing!"}</p>
            </section>
        };
    }

    let on_share = props.on_share.reform(|_: MouseEvent| ());

    html! {
        <section class="highscores">
            {
                for props.rows.iter().map(|row| html! {
                    <div class={classes!("highscore-item", row.highlighted.then_some("highlighted"))}>
                        <span class="highscore-rank">{format!("#{}", row.rank)}</span>
                        <div class="highscore-stats">
                            <span>{format!("{} moves", row.score.moves)}</span>
                            <span>{format!("{}s", row.score.time)}</span>
                        </div>
                    </div>
                })
            }
            if props.can_share {
                <button class="share-btn" onclick={on_share}>{"Share"}</button>
            }
        </section>
    }
}
