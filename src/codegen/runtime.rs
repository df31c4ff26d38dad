/// Routines provided by the simulator's syscall interface, by name. A program
/// declares them like any other function; the emitter appends a stub for each
/// one it calls without defining.
///
/// Values are the syscall codes loaded into `$v0`.
pub static BUILTINS: phf::Map<&'static str, u32> = phf::phf_map! {
    "print_number" => 1,
    "print_string" => 4,
    "read_number" => 5,
    "exit" => 10,
    "print_char" => 11,
};
