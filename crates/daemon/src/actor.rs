//! Single owner of the session.
//!
//! Client requests and watcher events arrive on separate channels and are
//! applied one at a time on the actor thread, so a watch event can never
//! interleave with a half-applied request.

use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::{
    channel::{self, Receiver, Sender},
    select,
};
use explite_engine::{DirectorySession, PolicyDialog};
use explite_fs::FileSystemProvider;
use explite_protocol::{DaemonReply, DaemonRequest, WatchEvent};
use log::{debug, info};

use crate::dispatch::dispatch;

struct Command {
    request: DaemonRequest,
    reply: Sender<DaemonReply>,
}

/// Cloneable handle for submitting requests to the actor.
#[derive(Clone)]
pub struct ActorHandle {
    commands: Sender<Command>,
}

impl ActorHandle {
    /// Submit `request` and wait for the session's reply.
    pub fn call(&self, request: DaemonRequest) -> Result<DaemonReply> {
        let (reply, response) = channel::bounded(1);
        self.commands
            .send(Command { request, reply })
            .context("Session actor has stopped")?;
        response.recv().context("Session actor dropped the request")
    }
}

/// Move `session` onto its own thread. The thread exits once every
/// [`ActorHandle`] is dropped.
pub fn spawn<P>(
    mut session: DirectorySession<P, PolicyDialog>,
    events: Receiver<WatchEvent>,
) -> Result<(ActorHandle, JoinHandle<()>)>
where
    P: FileSystemProvider + Send + 'static,
{
    let (commands, inbox) = channel::unbounded::<Command>();

    let handle = thread::Builder::new()
        .name("explite-session".into())
        .spawn(move || {
            run(&mut session, &inbox, &events);
            info!("Session actor stopped");
        })
        .context("Failed to spawn session actor")?;

    Ok((ActorHandle { commands }, handle))
}

fn run<P: FileSystemProvider>(
    session: &mut DirectorySession<P, PolicyDialog>,
    inbox: &Receiver<Command>,
    events: &Receiver<WatchEvent>,
) {
    let mut events_open = true;
    loop {
        if events_open {
            select! {
                recv(inbox) -> cmd => match cmd {
                    Ok(cmd) => handle(session, cmd),
                    Err(_) => break,
                },
                recv(events) -> ev => match ev {
                    Ok(ev) => {
                        session.on_watch_event(&ev);
                    }
                    Err(_) => {
                        debug!("Watch channel closed");
                        events_open = false;
                    }
                },
            }
        } else {
            match inbox.recv() {
                Ok(cmd) => handle(session, cmd),
                Err(_) => break,
            }
        }
    }
}

fn handle<P: FileSystemProvider>(session: &mut DirectorySession<P, PolicyDialog>, cmd: Command) {
    let reply = dispatch(session, cmd.request);
    // The client may have hung up; nothing to do about it here.
    let _ = cmd.reply.send(reply);
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
