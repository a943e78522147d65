//! Library fixtures on disk

use aninfo_sync::services::NfoStore;
use std::fs;
use std::path::{Path, PathBuf};

/// `tvshow.nfo` content with optional title and anilistid
pub fn tvshow_nfo(title: Option<&str>, anilist_id: Option<&str>) -> String {
    let mut doc = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<tvshow>\n");
    if let Some(title) = title {
        doc.push_str(&format!("  <title>{}</title>\n", title));
    }
    if let Some(id) = anilist_id {
        doc.push_str(&format!("  <anilistid>{}</anilistid>\n", id));
    }
    doc.push_str("  <plot>Show plot</plot>\n</tvshow>\n");
    doc
}

/// Episode `.nfo` content with the given title and episode text
pub fn episode_nfo(title: &str, episode: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<episodedetails>\n  <title>{}</title>\n  <episode>{}</episode>\n  <plot>Episode plot</plot>\n</episodedetails>\n",
        title, episode
    )
}

/// Create `<root>/<dir>` with a show file and the named episode files
///
/// Returns the show directory.
pub fn write_show(root: &Path, dir: &str, tvshow: &str, episodes: &[(&str, &str)]) -> PathBuf {
    let show_dir = root.join(dir);
    fs::create_dir_all(&show_dir).unwrap();
    fs::write(show_dir.join("tvshow.nfo"), tvshow).unwrap();
    for (name, content) in episodes {
        fs::write(show_dir.join(name), content).unwrap();
    }
    show_dir
}

/// (title, episode) as currently stored in an episode file
pub fn read_episode(path: &Path) -> (Option<String>, Option<String>) {
    let record = NfoStore::new().load(path).unwrap();
    (
        record.title().map(str::to_string),
        record.episode().map(str::to_string),
    )
}
