/*!
 * File Descriptor Kernel - Demo Entry Point
 *
 * Boots one process against an in-memory filesystem, forks it, and walks
 * both descriptor tables through open, shared I/O, close and exit.
 */

use miette::IntoDiagnostic;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use fdtable_kernel::vfs::types::{O_APPEND, O_CREAT, O_RDONLY, O_WRONLY};
use fdtable_kernel::{init_tracing, FdConfig, MemFS, Process};

fn main() -> miette::Result<()> {
    init_tracing();

    let config = FdConfig::from_env();
    config.validate()?;
    info!(capacity = config.capacity, console = %config.console_path.display(), "starting");

    let fs = MemFS::new();
    fs.write_file(Path::new("/data.txt"), b"shared offsets survive fork\n")
        .into_diagnostic()?;

    let parent = Process::spawn(1, Arc::new(fs.clone()), config)?;
    let fd = parent.open("/data.txt", O_RDONLY, 0)?;
    info!(fd, "parent opened /data.txt");
    let log = parent.open("/var/log/demo", O_WRONLY | O_CREAT | O_APPEND, 0o644)?;

    let child = parent.fork(2)?;

    let mut buf = [0u8; 6];
    let read = child.files().read(fd, &mut buf)?;
    info!(
        read,
        parent_offset = parent.files().get(fd)?.offset(),
        "child read advances the shared offset"
    );
    parent.files().seek(fd, SeekFrom::Start(0))?;

    parent.files().write(1, b"hello from the parent\n")?;
    child.files().write(1, b"hello from the child\n")?;
    parent.files().write(log, b"parent\n")?;
    child.files().write(log, b"child\n")?;

    let first = parent.files().close(fd)?;
    let second = child.files().close(fd)?;
    info!(?first, ?second, "closed the shared descriptor in both tables");

    child.exit();
    parent.exit();

    info!(
        console = %String::from_utf8_lossy(&fs.console().output()),
        log = %String::from_utf8_lossy(&fs.read_file(Path::new("/var/log/demo")).into_diagnostic()?),
        open_vnodes = fs.open_vnodes(),
        "done"
    );
    Ok(())
}
