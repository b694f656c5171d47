/// A place-holder for perhaps a more detailed/robust error reporting system in
/// the future

#[derive(Debug, Clone)]
pub struct BitmapErr {
    message: String,
}

impl BitmapErr {
    pub fn from(message: &str) -> Self {
        BitmapErr {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn display(&self) {
        eprintln!("{}", self.message);
    }
}

impl std::fmt::Display for BitmapErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BitmapErr {}

impl From<std::io::Error> for BitmapErr {
    fn from(error: std::io::Error) -> Self {
        BitmapErr::from(&error.to_string())
    }
}
