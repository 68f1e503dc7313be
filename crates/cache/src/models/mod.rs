mod work;

pub(crate) use self::work::WorkRow;
