use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::SchedulerStopped;
use crate::models::DocumentSnapshot;

use super::{Playback, ReaderView, TickOutcome};

/// Inputs accepted by the running scheduler
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Toggle,
    Reset,
    SetWordsPerMinute(u32),
    SetAutoContinue(bool),
    Seek(usize),
    Rewind,
    StepForward,
    NextParagraph,
    PreviousParagraph,
    Load(Arc<DocumentSnapshot>),
    Shutdown,
}

/// Client side of a spawned scheduler
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<PlaybackCommand>,
    view: watch::Receiver<ReaderView>,
}

impl SchedulerHandle {
    pub async fn send(&self, command: PlaybackCommand) -> Result<(), SchedulerStopped> {
        self.commands.send(command).await.map_err(|_| SchedulerStopped)
    }

    /// Latest published view
    pub fn view(&self) -> ReaderView {
        self.view.borrow().clone()
    }

    /// Wait for the next published view
    pub async fn changed(&mut self) -> Result<ReaderView, SchedulerStopped> {
        self.view.changed().await.map_err(|_| SchedulerStopped)?;
        Ok(self.view.borrow_and_update().clone())
    }

    pub async fn shutdown(&self) -> Result<(), SchedulerStopped> {
        self.send(PlaybackCommand::Shutdown).await
    }
}

/// Drive `playback` from a tokio task.
///
/// The task owns the state machine. Every command cancels the pending tick
/// before it is applied, so a tick never lands on state it was not
/// scheduled for. The task hands the state machine back when it exits.
pub fn spawn_scheduler(playback: Playback) -> (SchedulerHandle, JoinHandle<Playback>) {
    let (command_tx, command_rx) = mpsc::channel(32);
    let (view_tx, view_rx) = watch::channel(playback.view());

    let task = tokio::spawn(run(playback, command_rx, view_tx));
    let handle = SchedulerHandle {
        commands: command_tx,
        view: view_rx,
    };
    (handle, task)
}

async fn run(
    mut playback: Playback,
    mut commands: mpsc::Receiver<PlaybackCommand>,
    views: watch::Sender<ReaderView>,
) -> Playback {
    let mut ticker: Option<Interval> = None;
    info!("Playback scheduler started");

    loop {
        if ticker.is_none() && playback.is_playing() {
            ticker = start_ticker(&playback);
        }

        tokio::select! {
            biased;

            command = commands.recv() => {
                ticker = None;
                match command {
                    None | Some(PlaybackCommand::Shutdown) => break,
                    Some(command) => apply(&mut playback, command),
                }
                views.send_replace(playback.view());
            }

            _ = next_tick(&mut ticker) => {
                match playback.tick() {
                    TickOutcome::Advanced { .. } => {}
                    TickOutcome::ParagraphBoundary { index } => {
                        debug!("Stopped at paragraph boundary {}", index);
                        ticker = None;
                    }
                    TickOutcome::Finished => {
                        debug!("Reached end of document");
                        ticker = None;
                    }
                    TickOutcome::Idle => ticker = None,
                }
                views.send_replace(playback.view());
            }
        }
    }

    info!("Playback scheduler stopped");
    playback
}

fn start_ticker(playback: &Playback) -> Option<Interval> {
    let period = playback.interval()?;
    // First tick one full period after (re)start
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(ticker)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn apply(playback: &mut Playback, command: PlaybackCommand) {
    debug!("Playback command: {:?}", command);
    match command {
        PlaybackCommand::Play => {
            playback.play();
        }
        PlaybackCommand::Pause => playback.pause(),
        PlaybackCommand::Toggle => {
            playback.toggle();
        }
        PlaybackCommand::Reset => playback.reset(),
        PlaybackCommand::SetWordsPerMinute(wpm) => playback.set_words_per_minute(wpm),
        PlaybackCommand::SetAutoContinue(on) => playback.set_auto_continue(on),
        PlaybackCommand::Seek(index) => playback.seek(index),
        PlaybackCommand::Rewind => playback.rewind(),
        PlaybackCommand::StepForward => playback.step_forward(),
        PlaybackCommand::NextParagraph => playback.next_paragraph(),
        PlaybackCommand::PreviousParagraph => playback.previous_paragraph(),
        PlaybackCommand::Load(snapshot) => playback.load(snapshot),
        PlaybackCommand::Shutdown => {}
    }
}
