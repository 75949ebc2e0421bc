use std::time::{Duration, Instant, SystemTime};

use camino::Utf8Path;
use salsa::Setter as _;
use scenery_db::RootDatabase;
use scenery_reconcile::Debounce;

/// Re-checks `path` whenever it settles after a burst of writes.
pub(crate) fn run(path: &Utf8Path, delay: Duration) -> anyhow::Result<()> {
    let mut db = RootDatabase::default();
    let document = db.open(path, crate::read(path)?);
    crate::report(&db, document);

    let mut debounce = Debounce::new(delay);
    let mut stamp = modified(path);
    let tick = (delay / 4).max(Duration::from_millis(10));

    loop {
        std::thread::sleep(tick);
        let now = Instant::now();

        let current = modified(path);
        if current != stamp {
            stamp = current;
            debounce.poke(now);
        }
        if !debounce.poll(now) {
            continue;
        }

        let text = match crate::read(path) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!("{error:#}");
                continue;
            }
        };
        if text == document.text(&db) {
            continue;
        }

        tracing::debug!(%path, len = text.len(), "document changed");
        document.set_text(&mut db).to(text);
        let errors = crate::report(&db, document);
        eprintln!("`{path}`: {errors} error(s)");
    }
}

/// `None` while the file is missing, e.g. between an editor's unlink and rename.
fn modified(path: &Utf8Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|metadata| metadata.modified()).ok()
}
