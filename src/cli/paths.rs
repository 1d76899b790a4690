use std::path::PathBuf;

use clap::Parser;

use crate::settings::Paths;

#[derive(Parser)]
pub struct PathArgs {
    /// Live chart and `history.html`.
    #[clap(long = "live-path", env = "LIVE_PATH", default_value = "/var/www/html/pvmon")]
    live: PathBuf,

    /// Day files, the ledger, and the summary charts.
    #[clap(long = "archive-path", env = "ARCHIVE_PATH", default_value = "/var/www/html/pvmon/data")]
    archive: PathBuf,

    /// Public URL path of the archive location.
    #[clap(long = "web-path", env = "WEB_PATH", default_value = "/pvmon/data")]
    web: String,

    /// Used instead of both locations in the test mode.
    #[clap(long = "test-path", env = "TEST_PATH", default_value = "/var/www/html/pvmon/test")]
    test_path: PathBuf,
}

impl PathArgs {
    pub fn into_paths(self, test_mode: bool) -> Paths {
        if test_mode {
            Paths::single(self.test_path)
        } else {
            Paths { live: self.live, archive: self.archive, web: self.web }
        }
    }
}
