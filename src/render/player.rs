//! One voice's playback cursor and fade envelope.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::Channel;

/// Linear gain ramp. Level is interpolated from a snapshot taken when the
/// ramp starts, so it lands exactly on the target after `total` samples.
#[derive(Debug)]
struct FadeRamp {
    level: f32,
    start_level: f32,
    target: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl FadeRamp {
    fn at_unity() -> Self {
        Self {
            level: 1.0,
            start_level: 1.0,
            target: 1.0,
            total_samples: 0,
            elapsed_samples: 0,
        }
    }

    /// Jump straight to a level, no ramp.
    fn snap(&mut self, level: f32) {
        self.level = level;
        self.start_level = level;
        self.target = level;
        self.total_samples = 0;
        self.elapsed_samples = 0;
    }

    fn ramp_to(&mut self, target: f32, duration: Duration, sample_rate: u32) {
        let total = (duration.as_secs_f32() * sample_rate as f32).round() as u32;
        if total == 0 {
            self.snap(target);
            return;
        }
        self.start_level = self.level;
        self.target = target;
        self.total_samples = total;
        self.elapsed_samples = 0;
    }

    fn next_sample(&mut self) -> f32 {
        if self.elapsed_samples >= self.total_samples {
            self.level = self.target;
            return self.level;
        }
        let progress = self.elapsed_samples as f32 / self.total_samples as f32;
        self.level = self.start_level + (self.target - self.start_level) * progress;
        self.elapsed_samples += 1;
        self.level
    }
}

/// Streams one sample buffer at one frame per output frame.
///
/// No rate conversion happens here on purpose; see the crate-level rate
/// constants. A non-looped voice that runs off the end of its buffer goes
/// silent but stays nominally playing until an explicit stop - which is
/// exactly the situation the control side's dead-time reaper exists for.
pub struct VoicePlayer {
    frames: Option<Arc<[f32]>>,
    cursor: usize,
    looped: bool,
    gain: (f32, f32),
    fade: FadeRamp,
    sample_rate: u32,
}

impl VoicePlayer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: None,
            cursor: 0,
            looped: false,
            gain: (0.0, 0.0),
            fade: FadeRamp::at_unity(),
            sample_rate,
        }
    }

    /// Start streaming from the top. Restarts the fade envelope at unity,
    /// per the backend contract - a stolen half-faded voice must not hand
    /// its curve to the next occupant.
    pub fn play(&mut self, frames: Arc<[f32]>, looped: bool) {
        self.frames = Some(frames);
        self.cursor = 0;
        self.looped = looped;
        self.fade.snap(1.0);
    }

    pub fn stop(&mut self) {
        self.frames = None;
        self.cursor = 0;
    }

    pub fn set_gain(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::Left => self.gain.0 = value,
            Channel::Right => self.gain.1 = value,
        }
    }

    pub fn fade_out(&mut self, duration: Duration) {
        self.fade.ramp_to(0.0, duration, self.sample_rate);
    }

    pub fn fade_in(&mut self, duration: Duration) {
        self.fade.ramp_to(1.0, duration, self.sample_rate);
    }

    pub fn is_playing(&self) -> bool {
        self.frames.is_some()
    }

    /// Produce the next (left, right) contribution.
    #[inline]
    pub fn next_frame(&mut self) -> (f32, f32) {
        let frames = match &self.frames {
            Some(f) => f,
            None => return (0.0, 0.0),
        };
        if self.cursor >= frames.len() {
            if self.looped && !frames.is_empty() {
                self.cursor = 0;
            } else {
                return (0.0, 0.0); // ran off the end; silent until stopped
            }
        }
        let sample = frames[self.cursor];
        self.cursor += 1;
        let env = self.fade.next_sample();
        (sample * env * self.gain.0, sample * env * self.gain.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_frames(value: f32, len: usize) -> Arc<[f32]> {
        vec![value; len].into()
    }

    #[test]
    fn gains_shape_the_stereo_pair() {
        let mut player = VoicePlayer::new(1_000);
        player.play(constant_frames(1.0, 8), false);
        player.set_gain(Channel::Left, 0.5);
        player.set_gain(Channel::Right, 0.25);
        assert_eq!(player.next_frame(), (0.5, 0.25));
    }

    #[test]
    fn non_looped_voice_goes_silent_but_stays_playing() {
        let mut player = VoicePlayer::new(1_000);
        player.play(constant_frames(1.0, 2), false);
        player.set_gain(Channel::Left, 1.0);
        player.set_gain(Channel::Right, 1.0);
        player.next_frame();
        player.next_frame();
        assert_eq!(player.next_frame(), (0.0, 0.0));
        assert!(player.is_playing(), "only an explicit stop ends playback");
    }

    #[test]
    fn looped_voice_wraps_around() {
        let mut player = VoicePlayer::new(1_000);
        let frames: Arc<[f32]> = vec![0.1, 0.2].into();
        player.play(frames, true);
        player.set_gain(Channel::Left, 1.0);
        player.set_gain(Channel::Right, 1.0);
        player.next_frame();
        player.next_frame();
        let (l, _) = player.next_frame();
        assert!((l - 0.1).abs() < 1e-6);
    }

    #[test]
    fn fade_out_reaches_silence_after_its_duration() {
        let rate = 1_000;
        let mut player = VoicePlayer::new(rate);
        player.play(constant_frames(1.0, 4_000), false);
        player.set_gain(Channel::Left, 1.0);
        player.set_gain(Channel::Right, 1.0);
        player.fade_out(Duration::from_millis(100)); // 100 samples at 1 kHz

        let mut last = (1.0, 1.0);
        for _ in 0..101 {
            last = player.next_frame();
        }
        assert!(last.0.abs() < 1e-3, "faded to silence, got {}", last.0);
    }

    #[test]
    fn replaying_resets_a_half_faded_envelope() {
        let rate = 1_000;
        let mut player = VoicePlayer::new(rate);
        player.play(constant_frames(1.0, 4_000), false);
        player.set_gain(Channel::Left, 1.0);
        player.set_gain(Channel::Right, 1.0);
        player.fade_out(Duration::from_millis(100));
        for _ in 0..50 {
            player.next_frame(); // halfway down the ramp
        }

        player.play(constant_frames(1.0, 4_000), false);
        let (l, _) = player.next_frame();
        assert!((l - 1.0).abs() < 1e-6, "play restarts the envelope at unity");
    }

    #[test]
    fn zero_duration_fade_in_snaps_to_unity() {
        let mut player = VoicePlayer::new(1_000);
        player.play(constant_frames(1.0, 16), false);
        player.set_gain(Channel::Left, 1.0);
        player.set_gain(Channel::Right, 1.0);
        player.fade_out(Duration::from_millis(10));
        for _ in 0..16 {
            player.next_frame();
        }
        player.fade_in(Duration::ZERO);
        player.play(constant_frames(1.0, 16), false);
        assert_eq!(player.next_frame(), (1.0, 1.0));
    }
}
