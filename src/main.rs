#[macro_use]
extern crate tracing;

mod pace;

use self::pace::Pacer;
use anyhow::{Context, bail};
use rkyv::vec::ArchivedVec;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use zome_common::{
    ArchivedFrame, Colormap, FacesPattern, Frame, PatternConfig, ZomeModel, wire,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn default_model_file() -> PathBuf {
    PathBuf::from("zome_model.json")
}

#[derive(argh::FromArgs)]
/// Stream the zome faces pattern to stdout, one binary record per frame
struct Args {
    #[argh(positional, default = "default_model_file()")]
    /// the zome's model file
    model_file: PathBuf,

    #[argh(option)]
    /// frames per second to emit (as fast as the reader consumes when omitted)
    framerate: Option<f32>,

    #[argh(option)]
    /// seed for picking the colormaps
    seed: Option<u64>,

    #[argh(option)]
    /// stop after this many frames
    frames: Option<usize>,

    #[argh(option)]
    /// replay a clip written by zome-record instead of rendering live
    archive: Option<PathBuf>,

    #[argh(switch)]
    /// skip the checking of the archive
    ///
    /// will speed up initial loads at the cost of potential segfaults
    skip_checks: bool,
}

struct FrameSink<W> {
    writer: W,
    buf: Vec<u8>,
    pacer: Option<Pacer>,
}

impl<W: Write> FrameSink<W> {
    fn new(writer: W, pacer: Option<Pacer>) -> Self {
        Self {
            writer,
            buf: Vec::new(),
            pacer,
        }
    }

    /// Writes the record currently encoded in `buf`.
    fn send(&mut self, frame_id: u64) -> anyhow::Result<()> {
        if let Some(pacer) = &mut self.pacer {
            let behind = pacer.wait();
            if behind > 0 {
                warn!(frame_id, behind, "running behind, dropped frame slots");
            }
        }

        self.writer
            .write_all(&self.buf)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("failed to write frame {frame_id}"))?;

        trace!(frame_id, bytes = self.buf.len(), "sent frame");
        Ok(())
    }
}

fn stream_frames<W: Write>(
    frames: impl Iterator<Item = Frame>,
    sink: &mut FrameSink<W>,
) -> anyhow::Result<()> {
    for frame in frames {
        wire::encode_frame(frame.index, &frame.pixels, &mut sink.buf);
        sink.send(frame.index)?;
    }

    Ok(())
}

fn replay_clip<W: Write>(
    frames: &ArchivedVec<ArchivedFrame>,
    limit: usize,
    sink: &mut FrameSink<W>,
) -> anyhow::Result<()> {
    if frames.is_empty() {
        bail!("archive contains no frames");
    }

    for (idx, frame) in frames.iter().cycle().take(limit).enumerate() {
        // restamped so ids keep counting up across loops of the clip
        let frame_id = idx as u64;

        wire::encode_archived(frame_id, frame, &mut sink.buf);
        sink.send(frame_id)?;
    }

    Ok(())
}

fn run_live<W: Write>(args: &Args, limit: usize, sink: &mut FrameSink<W>) -> anyhow::Result<()> {
    info!("loading model..");
    let model = ZomeModel::load(&args.model_file)
        .with_context(|| format!("failed to load {}", args.model_file.display()))?;

    info!(
        pixels = model.num_pixels(),
        edges = model.num_edges(),
        faces = model.faces().len(),
        "loaded model successfully"
    );

    let config = PatternConfig {
        seed: args.seed,
        ..PatternConfig::default()
    };
    let pattern = FacesPattern::new(&model, config)?;

    let palette = pattern
        .palette()
        .iter()
        .map(Colormap::name)
        .collect::<Vec<_>>();
    info!(?palette, "picked colormaps");

    stream_frames(pattern.take(limit), sink)
}

fn run_archive<W: Write>(
    path: &Path,
    skip_checks: bool,
    limit: usize,
    sink: &mut FrameSink<W>,
) -> anyhow::Result<()> {
    info!("loading clip..");
    let data_file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let data = unsafe { memmap2::Mmap::map(&data_file)? };

    let frames: &ArchivedVec<ArchivedFrame> = if skip_checks {
        unsafe { rkyv::access_unchecked(&data) }
    } else {
        rkyv::access::<_, rkyv::rancor::Error>(&data)?
    };

    info!(frames = frames.len(), "loaded clip successfully");
    replay_clip(frames, limit, sink)
}

fn main() -> anyhow::Result<()> {
    // stdout carries the frames
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let args: Args = argh::from_env();

    let pacer = args.framerate.map(Pacer::new).transpose()?;
    let limit = args.frames.unwrap_or(usize::MAX);
    let mut sink = FrameSink::new(BufWriter::new(io::stdout().lock()), pacer);

    match &args.archive {
        Some(path) => run_archive(path, args.skip_checks, limit, &mut sink),
        None => run_live(&args, limit, &mut sink),
    }
}
