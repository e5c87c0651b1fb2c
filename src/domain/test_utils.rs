macro_rules! int {
    ($val:expr) => {
        $crate::domain::Value::Int($val)
    };
}

macro_rules! str_val {
    ($val:expr) => {
        $crate::domain::Value::Str($val.to_string())
    };
}

macro_rules! module_name {
    ($val:expr) => {
        $crate::domain::ModuleName::from_dotted($val).unwrap()
    };
}

macro_rules! module_path {
    ($val:expr) => {
        $crate::domain::ModulePath::parse($val).unwrap()
    };
}

pub(crate) use int;
pub(crate) use module_name;
pub(crate) use module_path;
pub(crate) use str_val;
