use serde::Serialize;

/// Elapsed-seconds counter for an active workout.
///
/// The registry ticker calls [`SessionTimer::tick`] once per second. There is
/// no wall-clock correction, so a delayed tick is simply a late second.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionTimer {
    elapsed_secs: u64,
    running: bool,
}

impl SessionTimer {
    pub fn started() -> Self {
        Self {
            elapsed_secs: 0,
            running: true,
        }
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_secs += 1;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}

/// Render seconds as `m:ss`. Minutes are not wrapped into hours.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
