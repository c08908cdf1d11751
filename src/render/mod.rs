// Purpose: software rendition of the fixed mixing topology. N voice players
// grouped in fours, each group summed by a sub-mixer, sub-mixers summed into
// one stereo master. The routing is built once and never changes; only gain
// values and play/stop/fade commands flow at runtime.

pub mod player;

use std::ops::Range;

use crate::backend::Command;
use crate::render::player::VoicePlayer;
use crate::store::SampleStore;
use crate::GROUP_SIZE;

/// Slot ranges for each sub-mixer: consecutive chunks of at most
/// [`GROUP_SIZE`] voices.
pub fn group_ranges(voices: usize) -> Vec<Range<usize>> {
    (0..voices)
        .step_by(GROUP_SIZE)
        .map(|start| start..(start + GROUP_SIZE).min(voices))
        .collect()
}

/// The render context's half of the system.
///
/// Commands are applied only between blocks (see [`Renderer::process_block`]),
/// so a stop+play pair or a two-channel gain update is always observed
/// whole. Nothing here blocks, locks, or allocates per frame.
pub struct Renderer {
    players: Vec<VoicePlayer>,
    groups: Vec<Range<usize>>,
    store: SampleStore,
}

impl Renderer {
    pub fn new(voices: usize, sample_rate: u32, store: SampleStore) -> Self {
        Self {
            players: (0..voices).map(|_| VoicePlayer::new(sample_rate)).collect(),
            groups: group_ranges(voices),
            store,
        }
    }

    pub fn groups(&self) -> &[Range<usize>] {
        &self.groups
    }

    /// Apply one control command. Fire-and-forget: a command referencing a
    /// missing slot or sample logs and does nothing.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Play {
                slot,
                sample,
                looped,
            } => {
                let frames = match self.store.frames(sample) {
                    Some(f) => f,
                    None => {
                        tracing::warn!(slot, sample, "play for unknown sample");
                        return;
                    }
                };
                if let Some(player) = self.players.get_mut(slot) {
                    player.play(frames, looped);
                }
            }
            Command::Stop { slot } => {
                if let Some(player) = self.players.get_mut(slot) {
                    player.stop();
                }
            }
            Command::SetGain {
                slot,
                channel,
                value,
            } => {
                if let Some(player) = self.players.get_mut(slot) {
                    player.set_gain(channel, value);
                }
            }
            Command::FadeOut { slot, duration } => {
                if let Some(player) = self.players.get_mut(slot) {
                    player.fade_out(duration);
                }
            }
            Command::FadeIn { slot, duration } => {
                if let Some(player) = self.players.get_mut(slot) {
                    player.fade_in(duration);
                }
            }
        }
    }

    /// Render interleaved stereo into `out` (`out.len()` must be even).
    pub fn render_block(&mut self, out: &mut [f32]) {
        debug_assert_eq!(out.len() % 2, 0);

        for frame in out.chunks_exact_mut(2) {
            let mut master = (0.0f32, 0.0f32);
            for group in &self.groups {
                // Per-group sub-mix, then into the master pair.
                let mut bus = (0.0f32, 0.0f32);
                for player in &mut self.players[group.clone()] {
                    let (l, r) = player.next_frame();
                    bus.0 += l;
                    bus.1 += r;
                }
                master.0 += bus.0;
                master.1 += bus.1;
            }
            frame[0] = master.0;
            frame[1] = master.1;
        }
    }

    /// Drain every pending command, then render one block. Keeping the drain
    /// at the block boundary is what makes multi-command updates atomic as
    /// far as the audible output is concerned.
    #[cfg(feature = "rtrb")]
    pub fn process_block(&mut self, rx: &mut rtrb::Consumer<Command>, out: &mut [f32]) {
        while let Ok(command) = rx.pop() {
            self.apply(command);
        }
        self.render_block(out);
    }

    pub fn playing_voices(&self) -> usize {
        self.players.iter().filter(|p| p.is_playing()).count()
    }
}
