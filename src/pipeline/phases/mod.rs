// Pipeline phases, executed in file order
//
// Each phase reads what earlier phases left in the context and records its
// own output there. A failing phase stops the run.

#[path = "01_descriptor.rs"]
pub mod descriptor;
#[path = "02_build.rs"]
pub mod build;
#[path = "03_discover.rs"]
pub mod discover;
#[path = "04_stage.rs"]
pub mod stage;
#[path = "05_image.rs"]
pub mod image;
