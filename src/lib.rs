/*!
# Gravitational Lensing Viewer

This crate renders an interactive view of a black hole bending the light of the scene around it.

## Overview

Every pixel shoots a ray from an orbiting camera. The ray is marched through the scene in short segments and
before each segment its direction is bent towards every massive body. A ray ends when it falls through the
event horizon, hits a body, crosses the accretion disk or leaves the scene. Rays that pass close to the hole
are bent around it, so bodies behind it show up as distorted arcs and the disk wraps over the horizon.

Frames are traced on the CPU, one row per task with [rayon](https://docs.rs/rayon), and shown with
[wgpu](https://docs.rs/wgpu/latest/wgpu/), letterboxed into the window at a fixed resolution.

## Feature Overview

- **Light Bending**: Weak-field deflection from the black hole and the orbiting bodies.
- **Accretion Disk**: Thin disk in the equatorial plane with a temperature gradient.
- **Orbit Camera**: Left-drag to orbit around the hole, scroll to zoom.
- **Custom Scenes**: Bodies, disk, camera and integrator settings come from a TOML file.
- **Headless Snapshots**: Render a single frame straight to a PNG.

## Modules

- [`lensing_lib`](../lensing_lib/index.html): Integrator, frame tracing, the windowed `State` and the `run` event loop.
- [`scene`](../scene/index.html): Bodies, disk, camera model, physical constants and configuration loading.
- [`wgpu_utils`](../wgpu_utils/index.html): GPU setup, the frame texture and bind group helpers.

## Usage

```rust no_run
use lensing::{run, RunOptions};

fn main() -> anyhow::Result<()> {
    // No config and no output file: default scene in a window
    pollster::block_on(run(RunOptions::default()))
}
```

From the command line:

```sh
cargo run --release
cargo run --release -- --config res/config.toml
cargo run --release -- --output snapshot.png
```

*/
pub use lensing_lib::{render_frame, run, Image, RenderSettings, RunOptions};
pub use scene;
