mod members;
pub use members::*;

mod meetings;
pub use meetings::*;

mod funerals;
pub use funerals::*;

mod common_works;
pub use common_works::*;

mod settings;
pub use settings::*;

mod serve;
pub use serve::*;
