use crate::highscores::HighscoresView;
use crate::theme::Theme;
use crate::utils::*;
use concentration_core as game;
use game::{CardFace, Effect, Intent, Mode, ShareDelivery};
use gloo::timers::callback::{Interval, Timeout};
use yew::prelude::*;

/// How long the new-best overlay stays up before the high scores are shown.
const CONGRATS_MILLIS: u32 = 3000;
const HIGHSCORES_AFTER_CONGRATS_MILLIS: u32 = 3200;
const HIGHSCORES_AFTER_GAME_MILLIS: u32 = 300;

#[derive(Copy, Clone, Debug, PartialEq)]
enum Screen {
    Board,
    Highscores,
}

#[derive(Clone, Debug, PartialEq)]
enum Notice {
    Copied,
    /// Copying failed everywhere; show the text so it can be copied by hand.
    ManualCopy(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Intent(Intent),
    ShowHighscores,
    HideCongrats,
    Shared(ShareDelivery),
    DismissNotice,
}

const fn face_classes(face: CardFace) -> &'static str {
    use CardFace::*;
    match face {
        Hidden => "hidden",
        FaceUp => "flipped",
        FaceUpRepeat => "selected",
        Matched => "matched",
    }
}

/// When to switch to the high scores after a completion, or `None` if the game belongs to a mode that is not shown.
fn highscores_delay(completion: &game::Completion, shown: Mode) -> Option<u32> {
    if completion.mode != shown {
        None
    } else if completion.is_new_best {
        Some(HIGHSCORES_AFTER_CONGRATS_MILLIS)
    } else {
        Some(HIGHSCORES_AFTER_GAME_MILLIS)
    }
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    card: game::CardView,
    #[prop_or_default]
    clickable: bool,
    callback: Callback<Intent>,
}

#[function_component(CardTile)]
fn card_component(props: &CardProps) -> Html {
    let CardProps {
        card,
        clickable,
        callback,
    } = props.clone();

    let id = card.id;
    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("card {} clicked (clickable: {})", id, clickable);
        if clickable {
            callback.emit(Intent::FlipCard(id));
        }
    });

    html! {
        <div class={classes!("card", face_classes(card.face))} data-id={id.to_string()} {onclick}>
            {card.symbol.unwrap_or_default()}
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameProps {
    pub config: game::SessionConfig,
    pub seed: u64,
}

pub(crate) struct GameView {
    session: game::Session<LocalStore>,
    snapshot: game::Snapshot,
    screen: Screen,
    congrats: Option<game::Score>,
    notice: Option<Notice>,
    ticker: Option<Interval>,
    pending_resolves: Vec<(game::ResolveTicket, Timeout)>,
    overlay_timers: Vec<Timeout>,
}

impl GameView {
    fn run_effect(&mut self, ctx: &Context<Self>, effect: Effect) -> bool {
        match effect {
            Effect::Render(snapshot) => {
                if snapshot.mode != self.snapshot.mode {
                    Theme::for_mode(snapshot.mode).apply();
                }
                self.snapshot = snapshot;
                true
            }
            Effect::ScheduleResolve { ticket, delay } => {
                let link = ctx.link().clone();
                let timeout = Timeout::new(timer_millis(delay), move || {
                    link.send_message(Msg::Intent(Intent::Resolve(ticket)))
                });
                self.pending_resolves.push((ticket, timeout));
                false
            }
            Effect::StartTicker { interval } => {
                let link = ctx.link().clone();
                self.ticker = Some(Interval::new(timer_millis(interval), move || {
                    link.send_message(Msg::Intent(Intent::Tick))
                }));
                false
            }
            Effect::StopTicker => {
                self.ticker = None;
                false
            }
            Effect::Completed(completion) => {
                self.on_completed(ctx, completion);
                true
            }
            Effect::Share(text) => {
                let link = ctx.link().clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let primary = clipboard_write(&text).await;
                    let delivery = game::settle_share(&text, primary, &mut TextAreaCopy);
                    link.send_message(Msg::Shared(delivery));
                });
                false
            }
        }
    }

    fn on_completed(&mut self, ctx: &Context<Self>, completion: game::Completion) {
        let Some(show_highscores_after) = highscores_delay(&completion, self.snapshot.mode) else {
            log::info!(
                "{} game finished while {} mode is shown, not interrupting",
                completion.mode.name(),
                self.snapshot.mode.name()
            );
            return;
        };

        self.overlay_timers.clear();
        if completion.is_new_best {
            self.congrats = Some(completion.score);
            self.overlay_timers
                .push(Self::message_after(ctx, CONGRATS_MILLIS, Msg::HideCongrats));
        }
        self.overlay_timers
            .push(Self::message_after(ctx, show_highscores_after, Msg::ShowHighscores));
    }

    fn message_after(ctx: &Context<Self>, millis: u32, msg: Msg) -> Timeout {
        let link = ctx.link().clone();
        Timeout::new(millis, move || link.send_message(msg))
    }

    fn view_board(&self, ctx: &Context<Self>) -> Html {
        let snapshot = &self.snapshot;
        let callback = ctx.link().callback(Msg::Intent);

        html! {
            <>
                <div class={classes!("board", snapshot.processing.then_some("processing"))}>
                    {
                        for snapshot.cards.iter().map(|card| {
                            let clickable = snapshot.is_clickable(card.id);
                            html! {
                                <CardTile card={card.clone()} {clickable} callback={callback.clone()}/>
                            }
                        })
                    }
                </div>
                <p class="stats">
                    <span>{format!("Moves: {}", snapshot.moves)}</span>
                    <span>{format!("Pairs: {}/{}", snapshot.matches, snapshot.total_pairs)}</span>
                    <span>{format!("Time: {}s", snapshot.elapsed_secs)}</span>
                </p>
            </>
        }
    }

    fn view_notice(&self, ctx: &Context<Self>) -> Html {
        let dismiss = ctx.link().callback(|_: MouseEvent| Msg::DismissNotice);
        match &self.notice {
            None => html! {},
            Some(Notice::Copied) => html! {
                <p class="notice" onclick={dismiss}>{"Result copied to clipboard"}</p>
            },
            Some(Notice::ManualCopy(text)) => html! {
                <div class="notice">
                    <p>{"Could not copy automatically. Copy your result from here:"}</p>
                    <pre>{text.clone()}</pre>
                    <button onclick={dismiss}>{"Close"}</button>
                </div>
            },
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let GameProps { config, seed } = ctx.props().clone();
        let (session, effects) = game::Session::load(config, LocalStore, seed, utc_now());
        let snapshot = session.snapshot();
        Theme::for_mode(snapshot.mode).apply();

        let mut view = Self {
            session,
            snapshot,
            screen: Screen::Board,
            congrats: None,
            notice: None,
            ticker: None,
            pending_resolves: Vec::new(),
            overlay_timers: Vec::new(),
        };
        for effect in effects {
            view.run_effect(ctx, effect);
        }
        view
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Intent(intent) => {
                let mut updated = false;
                match intent {
                    Intent::Resolve(ticket) => {
                        self.pending_resolves.retain(|(pending, _)| *pending != ticket);
                    }
                    Intent::StartNewGame(_) | Intent::SwitchMode(_) => {
                        self.screen = Screen::Board;
                        self.congrats = None;
                        self.overlay_timers.clear();
                        updated = true;
                    }
                    _ => {}
                }

                for effect in self.session.apply(intent, utc_now()) {
                    updated |= self.run_effect(ctx, effect);
                }
                updated
            }
            Msg::ShowHighscores => {
                self.screen = Screen::Highscores;
                true
            }
            Msg::HideCongrats => self.congrats.take().is_some(),
            Msg::Shared(delivery) => {
                self.notice = Some(match delivery {
                    ShareDelivery::Copied | ShareDelivery::CopiedWithFallback => Notice::Copied,
                    ShareDelivery::Failed { text } => Notice::ManualCopy(text),
                });
                true
            }
            Msg::DismissNotice => self.notice.take().is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let mode = self.snapshot.mode;
        let on_board = self.screen == Screen::Board;

        let cb_mode = |target: Mode| {
            ctx.link()
                .callback(move |_: MouseEvent| Msg::Intent(Intent::SwitchMode(target)))
        };
        let cb_new_game = ctx
            .link()
            .callback(move |_: MouseEvent| Msg::Intent(Intent::StartNewGame(mode)));
        let cb_show_highscores = ctx.link().callback(|_: MouseEvent| Msg::ShowHighscores);
        let cb_share = ctx.link().callback(|_: ()| Msg::Intent(Intent::RequestShare));

        let title = if on_board { mode.title() } else { "Highscores" };

        html! {
            <div class={classes!("concentration", mode.name())}>
                <nav class="toolbar">
                    <button class={classes!("toolbar-btn", (on_board && mode == Mode::Normal).then_some("active"))} onclick={cb_mode(Mode::Normal)}>{"Normal"}</button>
                    <button class={classes!("toolbar-btn", (on_board && mode == Mode::Hard).then_some("active"))} onclick={cb_mode(Mode::Hard)}>{"Hard"}</button>
                    <button class={classes!("toolbar-btn", (!on_board).then_some("active"))} onclick={cb_show_highscores}>{"Highscores"}</button>
                    <button class="toolbar-btn" onclick={cb_new_game}>{"New game"}</button>
                </nav>
                <h1>{title}</h1>
                if on_board {
                    {self.view_board(ctx)}
                } else {
                    <HighscoresView
                        rows={self.snapshot.ledger.clone()}
                        can_share={self.snapshot.last_score.is_some()}
                        on_share={cb_share}
                    />
                }
                if let Some(score) = self.congrats {
                    <Modal>
                        <dialog class="congrats" open={true}>
                            <h2>{"New best!"}</h2>
                            <p>{format!("{} moves", score.moves)}</p>
                            <p>{format!("{}s", score.time)}</p>
                        </dialog>
                    </Modal>
                }
                {self.view_notice(ctx)}
            </div>
        }
    }
}
