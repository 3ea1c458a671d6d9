use std::io::Write;

use cipsi_core::io::{
    read_fcidump,
    read_reference_energy,
    read_wavefunction,
};

const FCIDUMP_H2: &str = "\
 &FCI NORB=2,NELEC=2,MS2=0,
ORBSYM=1,1,
ISYM=1,
&END
 0.67571015480352  1 1 1 1
 0.18093119978423  2 1 1 1
 0.66458173025530  2 1 2 1
 0.69857372273202  2 2 2 2
-1.25633907300325  1 1 0 0
-0.47189600728114  2 2 0 0
 0.71996899444898  0 0 0 0
";

#[test]
fn fcidump_round_trips_through_a_gz_file() {
    use flate2::{
        write::GzEncoder,
        Compression,
    };

    let path = std::env::temp_dir().join("cipsi-core-test-h2.fcidump.gz");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(FCIDUMP_H2.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    let store = read_fcidump(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(store.n_orb, 2);
    assert!((store.e0 - 0.71996899444898).abs() < 1e-10);
    assert!((store.one_e(0, 0) - (-1.25633907300325)).abs() < 1e-10);
    assert!((store.two_e(0, 0, 1, 1) - 0.18093119978423).abs() < 1e-10);
}

#[test]
fn wavefunction_and_reference_energy_files_parse_together() {
    let mut wf_file = tempfile::Builder::new().suffix(".wf").tempfile().unwrap();
    write!(wf_file, "1.0 ++ ++\n").unwrap();

    let mut ref_file = tempfile::Builder::new().suffix(".ref").tempfile().unwrap();
    write!(ref_file, "Reference E = -1.1372838344\n").unwrap();

    let wf = read_wavefunction(wf_file.path()).unwrap();
    assert_eq!(wf.len(), 1);
    assert!((wf.norm() - 1.0).abs() < 1e-12);

    let eref = read_reference_energy(ref_file.path()).unwrap();
    assert!((eref - (-1.1372838344)).abs() < 1e-9);
}
