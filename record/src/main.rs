#[macro_use]
extern crate tracing;

use anyhow::Context;
use rkyv::{
    Archive, Serialize,
    api::serialize_using,
    rancor::Strategy,
    ser::{allocator::Arena, sharing::Share, writer::IoWriter},
    vec::{ArchivedVec, VecResolver},
    with::{ArchiveWith, SerializeWith},
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};
use zome_common::{ArchivedFrame, Colormap, FacesPattern, PatternConfig, ZomeModel};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(argh::FromArgs)]
/// pre-render the zome faces pattern into a clip that zome-faces can replay
struct Args {
    #[argh(positional)]
    /// the zome's model file
    model_file: PathBuf,

    #[argh(option)]
    /// path to output file
    output: PathBuf,

    #[argh(option, default = "2000")]
    /// number of frames to render (one full colormap cycle by default)
    frames: u32,

    #[argh(option)]
    /// seed for picking the colormaps
    seed: Option<u64>,
}

/// Frames `0..len` of a pattern, rendered while they are serialized.
struct Clip {
    pattern: FacesPattern,
    len: u32,
}

struct ClipSerializer;

impl ArchiveWith<Clip> for ClipSerializer {
    type Archived = ArchivedVec<ArchivedFrame>;
    type Resolver = VecResolver;

    fn resolve_with(field: &Clip, resolver: Self::Resolver, out: rkyv::Place<Self::Archived>) {
        ArchivedVec::resolve_from_len(field.len as usize, resolver, out)
    }
}

impl<S> SerializeWith<Clip, S> for ClipSerializer
where
    S: rkyv::rancor::Fallible,
    S: rkyv::ser::Writer<S::Error> + rkyv::ser::Allocator,
{
    fn serialize_with(
        field: &Clip,
        serializer: &mut S,
    ) -> Result<Self::Resolver, <S as rkyv::rancor::Fallible>::Error> {
        let frames = (0..field.len).map(|index| {
            if index % 500 == 0 {
                debug!(index, "rendering frame");
            }
            field.pattern.render_frame(u64::from(index))
        });

        ArchivedVec::serialize_from_iter(frames, serializer)
    }
}

// same layout as `ArchivedVec<ArchivedFrame>`, which is how the clip is read back
#[derive(Archive, Serialize)]
#[repr(transparent)]
struct ArchiveClip(#[rkyv(with = ClipSerializer)] Clip);

fn write_clip<W: Write>(clip: Clip, mut writer: W) -> anyhow::Result<W> {
    {
        let mut arena = Arena::new();
        let mut serializer = rkyv::ser::Serializer {
            writer: IoWriter::new(&mut writer),
            allocator: arena.acquire(),
            sharing: Share::new(),
        };
        let serializer = Strategy::<_, rkyv::rancor::Error>::wrap(&mut serializer);
        serialize_using(&ArchiveClip(clip), serializer)?;
    }

    writer.flush()?;
    Ok(writer)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();

    let model = ZomeModel::load(&args.model_file)
        .with_context(|| format!("failed to load {}", args.model_file.display()))?;

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
    info!(?palette, frames = args.frames, "recording clip");

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let clip = Clip {
        pattern,
        len: args.frames,
    };
    write_clip(clip, BufWriter::new(file))?;

    info!(output = %args.output.display(), "recorded clip");

    Ok(())
}
