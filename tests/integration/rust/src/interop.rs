//! Shared records and captured frames.

/// Login reply captured from a game server, hex encoded.
///
/// The header declares 136 payload bytes while 149 follow, as sent by
/// the server. Flag bit 0x80 is set and carries no meaning here.
pub const LOGIN_RETURN_FRAME: &str = concat!(
    "800088",
    "120003",
    "000170120002",
    "000170120006",
    "00096c6f67696e526f6f6d080009534c4f545f524f4f4d",
    "0004646174610101",
    "000762616c616e63650740c15c0000000000",
    "0008746573744d6f64650100",
    "000873657276657249640800023031",
    "000274730742798bbc7d19c000",
    "00016308000f67616d654c6f67696e52657475726e",
    "00016107402a000000000000",
    "000163073ff0000000000000",
);

/// Payload length actually present in [`LOGIN_RETURN_FRAME`].
pub const LOGIN_RETURN_PAYLOAD_LEN: u16 = 149;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoginData {
    pub login_room: String,
    pub data: bool,
    pub balance: f64,
    pub test_mode: bool,
    pub server_id: String,
    pub ts: f64,
}

sfs::record!(LoginData {
    login_room => "loginRoom",
    data => "data",
    balance => "balance",
    test_mode => "testMode",
    server_id => "serverId",
    ts => "ts",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoginParams {
    pub params: LoginData,
    pub command: String,
}

sfs::record!(LoginParams {
    params => "p",
    command => "c",
});

/// Top-level envelope: action id, controller id and parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Envelope {
    pub params: LoginParams,
    pub action: f64,
    pub controller: f64,
}

sfs::record!(Envelope {
    params => "p",
    action => "a",
    controller => "c",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Data {
    pub name: String,
    pub age: i32,
}

sfs::record!(Data {
    name => "name",
    age => "age",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Respond {
    pub code: i32,
    pub data: Vec<Data>,
    pub msg: String,
}

sfs::record!(Respond {
    code => "code",
    data => "data",
    msg => "msg,optional",
});

/// Record exercising every scalar and typed array mapping.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AllTypes {
    pub flag: bool,
    pub tiny: i8,
    pub byte: u8,
    pub short: i16,
    pub int: i32,
    pub long: i64,
    pub unsigned: u64,
    pub float: f32,
    pub double: f64,
    pub text: String,
    pub flags: Vec<bool>,
    pub bytes: Vec<u8>,
    pub shorts: Vec<i16>,
    pub ints: Vec<i32>,
    pub longs: Vec<i64>,
    pub floats: Vec<f32>,
    pub doubles: Vec<f64>,
    pub names: Vec<String>,
    pub nested: Vec<Data>,
    pub narrowed: i64,
}

sfs::record!(AllTypes {
    flag,
    tiny,
    byte,
    short,
    int,
    long,
    unsigned,
    float,
    double,
    text => "text,type=TEXT",
    flags => "flags,optional",
    bytes => "bytes,optional",
    shorts => "shorts,optional",
    ints => "ints,optional",
    longs => "longs,optional",
    floats => "floats,optional",
    doubles => "doubles,optional",
    names => "names,optional",
    nested => "nested,optional",
    narrowed => "narrowed,type=SHORT",
});
