//! DOSBox configuration written into each bundle's `.jsdos/dosbox.conf`.

use crate::manifest::GameDefinition;

/// Render the configuration for `game`.
///
/// With `music` off, OPL/AdLib music plus the Tandy and Disney devices are
/// disabled; Sound Blaster effects and the PC speaker stay on.
pub fn generate(game: &GameDefinition, music: bool) -> String {
    let (oplmode, tandy, disney) = if music {
        ("auto", "auto", "true")
    } else {
        ("none", "off", "false")
    };

    format!(
        "[sdl]
fullscreen=false
output=surface
autolock=true

[dosbox]
machine=svga_s3
memsize=16

[render]
frameskip=0
aspect=false
scaler=normal2x

[cpu]
core=auto
cputype=auto
cycles=auto

[mixer]
nosound=false
rate=44100
blocksize=1024
prebuffer=20

[sblaster]
sbtype=sb16
sbbase=220
irq=7
dma=1
hdma=5
sbmixer=true
oplmode={oplmode}
oplrate=44100

[gus]
gus=false

[speaker]
pcspeaker=true
pcrate=44100
tandy={tandy}
disney={disney}

[joystick]
joysticktype=auto

[dos]
xms=true
ems=true
umb=true

[autoexec]
{autoexec}
",
        autoexec = autoexec(game),
    )
}

fn autoexec(game: &GameDefinition) -> String {
    let mount = match (&game.img_file, &game.img_size) {
        (Some(img), Some(size)) => format!("imgmount c {img} -size {size}"),
        (Some(img), None) => format!("imgmount c {img}"),
        _ => "mount c .".to_string(),
    };
    format!("{mount}\nc:\n{}", game.executable)
}
