use super::commands::Command;
use super::state::PlaybackState;

impl PlaybackState {
    /// Applies one client command at clock reading `now`.
    ///
    /// Returns `true` when the command's precondition held and the state changed,
    /// meaning every client is owed a fresh snapshot. A failed precondition leaves the
    /// state untouched and returns `false`; nothing is reported back to the sender.
    pub fn apply(&mut self, command: &Command, now: f64) -> bool {
        match command {
            Command::Play { position } => self.play(position.map(sanitize_position), now),
            Command::Pause => self.pause(now),
            Command::Seek { position } => self.seek(sanitize_position(*position), now),
            Command::AddToQueue { song } => self.add_to_queue(song),
            Command::RemoveFromQueue { song } => self.remove_from_queue(song),
            Command::PlaySong { song } => self.play_song(song, now),
            Command::NextSong => self.next_song(now),
        }
    }

    fn play(&mut self, position: Option<f64>, now: f64) -> bool {
        if self.current_song.is_none() {
            return false;
        }

        match position {
            Some(position) => {
                self.start_time = now - position;
                self.pause_accumulator = 0.0;
            }
            None => {
                if let Some(paused_at) = self.paused_at {
                    self.pause_accumulator += now - paused_at;
                }
            }
        }

        self.paused_at = None;
        self.is_playing = true;
        true
    }

    fn pause(&mut self, now: f64) -> bool {
        if self.current_song.is_none() {
            return false;
        }

        // Pausing twice must not move the frozen position
        if self.is_playing {
            self.is_playing = false;
            self.paused_at = Some(now);
        }
        true
    }

    fn seek(&mut self, position: f64, now: f64) -> bool {
        if self.current_song.is_none() {
            return false;
        }

        self.start_time = now - position;
        self.pause_accumulator = 0.0;
        if !self.is_playing {
            self.paused_at = Some(now);
        }
        true
    }

    fn add_to_queue(&mut self, song: &str) -> bool {
        if !self.available_songs.contains(song) || self.queue.iter().any(|s| s == song) {
            return false;
        }

        self.queue.push(song.to_string());
        true
    }

    fn remove_from_queue(&mut self, song: &str) -> bool {
        match self.queue.iter().position(|s| s == song) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    fn play_song(&mut self, song: &str, now: f64) -> bool {
        if !self.available_songs.contains(song) {
            return false;
        }

        self.queue.retain(|s| s != song);
        self.promote(song.to_string(), now);
        true
    }

    fn next_song(&mut self, now: f64) -> bool {
        if self.queue.is_empty() {
            return false;
        }

        let song = self.queue.remove(0);
        self.promote(song, now);
        true
    }

    /// Makes `song` current and starts it from zero.
    fn promote(&mut self, song: String, now: f64) {
        self.current_song = Some(song);
        self.is_playing = true;
        self.start_time = now;
        self.pause_accumulator = 0.0;
        self.paused_at = None;
    }
}

fn sanitize_position(position: f64) -> f64 {
    if position.is_finite() { position.max(0.0) } else { 0.0 }
}
