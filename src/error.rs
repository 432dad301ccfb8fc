use failure::Fail;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "failed to load {}: {}", path, reason)]
    Load { path: String, reason: String },

    #[fail(display = "failed to parse {}: {}", path, reason)]
    Parse { path: String, reason: String },

    #[fail(display = "{} has no GPS coordinates", name)]
    MissingGps { name: String },

    #[fail(display = "{} has no {} reference", name, tag)]
    MissingReference { name: String, tag: &'static str },

    #[fail(display = "invalid coordinate: {}", _0)]
    InvalidCoordinate(String),

    #[fail(display = "invalid hemisphere reference: {:?}", _0)]
    InvalidReference(String),

    #[fail(display = "{} contains no track or route lines", path)]
    EmptyRoute { path: String },

    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),

    #[fail(display = "failed to render template: {}", _0)]
    Render(String),
}

impl Error {
    pub(crate) fn load(path: &str, reason: impl ToString) -> Self {
        Error::Load { path: path.to_owned(), reason: reason.to_string() }
    }

    pub(crate) fn parse(path: &str, reason: impl ToString) -> Self {
        Error::Parse { path: path.to_owned(), reason: reason.to_string() }
    }
}
